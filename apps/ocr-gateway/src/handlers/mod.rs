//! HTTP handlers and route configuration.

mod health;
mod recognize;
mod root;


use actix_web::{HttpRequest, HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes under `api_prefix`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.route("/", web::get().to(root::service_info)).service(
        web::scope(api_prefix)
            .route("/health", web::get().to(health::health_check))
            // Recognition routes
            .route("/text", web::post().to(recognize::text))
            .route("/document", web::post().to(recognize::document))
            .route("/document/vl_model", web::post().to(recognize::document))
            .route("/table", web::post().to(recognize::table))
            .route(
                "/document/structure_model",
                web::post().to(recognize::table),
            ),
    );
}

/// Fallback for unknown routes.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
