use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Every way a reply-drafting request can fail.
///
/// Each kind maps to exactly one HTTP status; see [`ResponseError::status_code`].
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Missing environment variable: {var}. Please ensure AZURE_OPENAI_API_KEY, AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_DEPLOYMENT_NAME are set.")]
    Configuration { var: &'static str },

    #[error("Error initializing Azure OpenAI client: {0}")]
    ClientInitialization(String),

    #[error("Please pass a JSON body in the request.")]
    MalformedBody,

    #[error("Please provide 'subject', 'body', and 'sender_name' in the request body.")]
    MissingField,

    #[error("An error occurred while generating the reply: {0}")]
    Completion(String),
}

impl ResponseError for ReplyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReplyError::MalformedBody | ReplyError::MissingField => StatusCode::BAD_REQUEST,
            ReplyError::Configuration { .. }
            | ReplyError::ClientInitialization(_)
            | ReplyError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
