mod error;
mod model;
mod web;

use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use std::env;

use web::routes;

// Azure Functions hands custom handlers their port through this variable
const CUSTOM_HANDLER_PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

fn bind_address() -> Result<(String, u16)> {
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = match env::var(CUSTOM_HANDLER_PORT_VAR).or_else(|_| env::var("PORT")) {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("Invalid port value: {}", raw))?,
        Err(_) => 8080,
    };

    Ok((host, port))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let (host, port) = bind_address()?;
    info!("Starting email reply drafter on {}:{}", host, port);

    // Azure OpenAI settings are read per request, nothing to preload here
    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}
