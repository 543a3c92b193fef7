//! Root endpoint - service identity and route map.

use actix_web::{HttpResponse, web};
use ocrgw_shared::dto::{PipelineRoutes, ServiceInfo};

use crate::state::AppState;

/// GET /
pub async fn service_info(state: web::Data<AppState>) -> HttpResponse {
    let prefix = &state.meta.api_prefix;

    HttpResponse::Ok().json(ServiceInfo {
        name: state.meta.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: state.meta.description.clone(),
        docs_url: format!("{}/docs", prefix),
        health_check: format!("{}/health", prefix),
        pipelines: PipelineRoutes {
            ocrv5: format!("{}/text", prefix),
            vl: format!("{}/document", prefix),
            structure: format!("{}/table", prefix),
        },
    })
}
