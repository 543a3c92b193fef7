//! Domain entities - pipelines, their inputs and outputs, health and metrics.

mod health;
mod metrics;
mod pipeline;

pub use health::{OverallStatus, PipelineHealth, PipelineStatus};
pub use metrics::RequestMetrics;
pub use pipeline::{
    FileKind, InferenceSource, OutputFormat, PipelineInput, PipelineKind, PredictOptions,
    Prediction,
};
