use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::{error, info, warn};
use serde_json::json;

use crate::error::ReplyError;
use crate::model::prompt::build_prompt;
use crate::model::AzureOpenAIClient;
use crate::web::models::{HelloQuery, IncomingReplyRequest, ReplyResponse};

// Greeting endpoint; an unreadable query string just falls back to the default
pub async fn hello_world(query: Option<web::Query<HelloQuery>>) -> impl Responder {
    let name = query
        .and_then(|q| q.into_inner().name)
        .unwrap_or_else(|| "World".to_string());

    info!("Processing GET request. Name: {}", name);

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Hello, {}!", name))
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Reply drafting endpoint; an unreadable or oversized payload is reported like a bad body
pub async fn reply_email(body: Result<web::Bytes, actix_web::Error>) -> impl Responder {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!("Error reading request body: {}", e);
            return ReplyError::MalformedBody.error_response();
        }
    };

    match draft_reply(&body).await {
        Ok(reply) => HttpResponse::Ok().json(reply),
        Err(e) => {
            error!("Failed to draft reply: {:?}", e);
            e.error_response()
        }
    }
}

async fn draft_reply(body: &[u8]) -> Result<ReplyResponse, ReplyError> {
    let request = IncomingReplyRequest::from_slice(body)?;
    let client = AzureOpenAIClient::from_env()?;

    info!(
        "Drafting reply to '{}' from {}",
        request.subject, request.sender_name
    );

    let prompt = build_prompt(&request);
    let reply_body = client.generate_reply(&prompt).await?;

    Ok(ReplyResponse::new(&request.subject, reply_body))
}
