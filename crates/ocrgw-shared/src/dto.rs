//! Data Transfer Objects - informational responses of the API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: String,
    pub timestamp: String,
    /// Per-pipeline reports keyed by pipeline name.
    pub pipelines: BTreeMap<String, serde_json::Value>,
}

/// Response of the root endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub docs_url: String,
    pub health_check: String,
    pub pipelines: PipelineRoutes,
}

/// Upload route of each pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRoutes {
    pub ocrv5: String,
    pub vl: String,
    pub structure: String,
}
