use actix_web::web;
use crate::web::handlers;

/// Largest request body accepted by `/replyemail`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES));

    // Azure Functions serves HTTP triggers under /api, so both forms resolve
    cfg.service(web::scope("/api").configure(function_routes))
        .configure(function_routes)
        .route("/health", web::get().to(handlers::health_check));
}

fn function_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/helloworld", web::get().to(handlers::hello_world))
        .route("/replyemail", web::post().to(handlers::reply_email));
}
