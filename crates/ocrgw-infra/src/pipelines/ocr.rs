//! PP-OCRv5 text recognition pipeline.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Map;

use ocrgw_core::domain::{
    InferenceSource, PipelineHealth, PipelineInput, PipelineKind, Prediction,
};
use ocrgw_core::error::PipelineError;
use ocrgw_core::normalize::format_ocr;
use ocrgw_core::ports::Pipeline;

use super::client::{ServingClient, ServingConfig};

/// Text OCR running on the host's serving process.
pub struct OcrPipeline {
    client: ServingClient,
}

impl OcrPipeline {
    pub fn new(config: &ServingConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            client: ServingClient::new(config)?,
        })
    }
}

#[async_trait]
impl Pipeline for OcrPipeline {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Ocrv5
    }

    fn source(&self) -> InferenceSource {
        InferenceSource::Local
    }

    async fn predict(&self, input: &PipelineInput) -> Result<Prediction, PipelineError> {
        let start = Instant::now();
        let raw = self.client.infer(input, Map::new()).await?;
        let inference_time = start.elapsed().as_secs_f64();

        Ok(Prediction {
            result: format_ocr(raw),
            inference_time,
            source: self.source(),
        })
    }

    async fn health_check(&self) -> PipelineHealth {
        if self.client.is_healthy().await {
            PipelineHealth::ready(self.client.endpoint())
        } else {
            PipelineHealth::unavailable(self.client.endpoint(), "Serving endpoint unreachable")
        }
    }
}
