//! Health check endpoint.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use futures::future::join_all;
use ocrgw_core::domain::{OverallStatus, PipelineHealth, PipelineKind};
use ocrgw_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - probes every pipeline concurrently.
///
/// GET {prefix}/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let probes = PipelineKind::ALL.map(|kind| {
        let pipeline = state.pipelines.get(kind).cloned();
        async move {
            let health = match pipeline {
                Some(pipeline) => pipeline.health_check().await,
                None => PipelineHealth::not_initialized(),
            };
            (kind, health)
        }
    });
    let reports: Vec<(PipelineKind, PipelineHealth)> = join_all(probes).await;

    let status = OverallStatus::aggregate(reports.iter().map(|(_, health)| health));
    if status != OverallStatus::Healthy {
        tracing::warn!(status = ?status, "Gateway is not fully healthy");
    }

    let pipelines: BTreeMap<String, serde_json::Value> = reports
        .into_iter()
        .map(|(kind, health)| {
            let report = serde_json::to_value(&health).unwrap_or_default();
            (kind.as_str().to_string(), report)
        })
        .collect();

    HttpResponse::Ok().json(HealthResponse {
        status: status.as_str().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        pipelines,
    })
}
