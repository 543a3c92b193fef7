use async_trait::async_trait;

use crate::domain::{InferenceSource, PipelineHealth, PipelineInput, PipelineKind, Prediction};
use crate::error::PipelineError;

/// Pipeline trait - abstraction over a document-understanding model.
///
/// Implementations own the call to the model and the normalization of its
/// raw output; callers only ever see the uniform [`Prediction`] shape.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Which of the gateway's pipelines this is.
    fn kind(&self) -> PipelineKind;

    /// Where inference runs.
    fn source(&self) -> InferenceSource;

    /// Run inference on a staged upload.
    async fn predict(&self, input: &PipelineInput) -> Result<Prediction, PipelineError>;

    /// Probe the backend. Never fails; problems are reported in the result.
    async fn health_check(&self) -> PipelineHealth;
}
