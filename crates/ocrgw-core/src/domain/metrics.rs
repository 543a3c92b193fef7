use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InferenceSource, PipelineKind};

/// Timing and size figures for one handled request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    pub pipeline: PipelineKind,
    pub timestamp: DateTime<Utc>,
    /// Seconds from request start to response.
    pub total_time: f64,
    pub inference_time: f64,
    pub upload_time: Option<f64>,
    pub preprocess_time: Option<f64>,
    pub image_size_kb: f64,
    /// Client-declared compression flag, echoed back.
    pub compressed: bool,
    pub source: InferenceSource,
}
