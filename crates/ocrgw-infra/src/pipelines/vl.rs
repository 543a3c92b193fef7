//! PaddleOCR-VL document parsing pipeline.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Map;

use ocrgw_core::domain::{
    InferenceSource, OutputFormat, PipelineHealth, PipelineInput, PipelineKind, Prediction,
};
use ocrgw_core::error::PipelineError;
use ocrgw_core::normalize::{format_vl_json, format_vl_markdown};
use ocrgw_core::ports::Pipeline;

use super::client::{ServingClient, ServingConfig, probe, vllm_health_url};

/// Vision-language parsing. The serving process delegates recognition to a
/// vLLM server running in Docker, so both must be up for the pipeline to be ready.
pub struct VlPipeline {
    client: ServingClient,
    vllm_endpoint: String,
    vllm_health_url: String,
}

impl VlPipeline {
    pub fn new(
        config: &ServingConfig,
        vllm_endpoint: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let vllm_endpoint = vllm_endpoint.into();
        Ok(Self {
            client: ServingClient::new(config)?,
            vllm_health_url: vllm_health_url(&vllm_endpoint),
            vllm_endpoint,
        })
    }

    pub fn vllm_endpoint(&self) -> &str {
        &self.vllm_endpoint
    }
}

#[async_trait]
impl Pipeline for VlPipeline {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Vl
    }

    fn source(&self) -> InferenceSource {
        InferenceSource::Docker
    }

    async fn predict(&self, input: &PipelineInput) -> Result<Prediction, PipelineError> {
        let start = Instant::now();
        let raw = self.client.infer(input, Map::new()).await?;
        let inference_time = start.elapsed().as_secs_f64();

        let result = match input.options.output_format {
            OutputFormat::Json => format_vl_json(raw),
            OutputFormat::Markdown => format_vl_markdown(raw),
        };

        Ok(Prediction {
            result,
            inference_time,
            source: self.source(),
        })
    }

    async fn health_check(&self) -> PipelineHealth {
        let (serving_ok, vllm_ok) = tokio::join!(
            self.client.is_healthy(),
            probe(self.client.http(), &self.vllm_health_url)
        );

        let mut health = if serving_ok && vllm_ok {
            PipelineHealth::ready(self.client.endpoint())
        } else if !serving_ok {
            PipelineHealth::unavailable(self.client.endpoint(), "Serving endpoint unreachable")
        } else {
            let mut health =
                PipelineHealth::unavailable(self.client.endpoint(), "vLLM server unreachable");
            health.model_loaded = true;
            health
        };
        health.vllm_endpoint = Some(self.vllm_endpoint.clone());
        health.vllm_health = Some(vllm_ok);
        health
    }
}
