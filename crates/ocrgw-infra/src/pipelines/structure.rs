//! PP-StructureV3 layout, table and formula pipeline.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};

use ocrgw_core::domain::{
    InferenceSource, OutputFormat, PipelineHealth, PipelineInput, PipelineKind, Prediction,
};
use ocrgw_core::error::PipelineError;
use ocrgw_core::normalize::{format_structure_json, format_structure_markdown};
use ocrgw_core::ports::Pipeline;

use super::client::{ServingClient, ServingConfig};

/// Sub-models enabled on the structure backend.
#[derive(Debug, Clone, Copy)]
pub struct StructureOptions {
    pub use_table_recognition: bool,
    pub use_formula_recognition: bool,
    pub use_region_detection: bool,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            use_table_recognition: true,
            use_formula_recognition: true,
            use_region_detection: true,
        }
    }
}

impl StructureOptions {
    fn flags(&self) -> Map<String, Value> {
        let mut flags = Map::new();
        flags.insert("useTableRecognition".into(), self.use_table_recognition.into());
        flags.insert("useFormulaRecognition".into(), self.use_formula_recognition.into());
        flags.insert("useRegionDetection".into(), self.use_region_detection.into());
        flags
    }
}

/// Document structure recognition running on the host's serving process.
pub struct StructurePipeline {
    client: ServingClient,
    options: StructureOptions,
}

impl StructurePipeline {
    pub fn new(config: &ServingConfig, options: StructureOptions) -> Result<Self, PipelineError> {
        Ok(Self {
            client: ServingClient::new(config)?,
            options,
        })
    }
}

#[async_trait]
impl Pipeline for StructurePipeline {
    fn kind(&self) -> PipelineKind {
        PipelineKind::Structure
    }

    fn source(&self) -> InferenceSource {
        InferenceSource::Local
    }

    async fn predict(&self, input: &PipelineInput) -> Result<Prediction, PipelineError> {
        let start = Instant::now();
        let raw = self.client.infer(input, self.options.flags()).await?;
        let inference_time = start.elapsed().as_secs_f64();

        let result = match input.options.output_format {
            OutputFormat::Json => format_structure_json(raw, input.options.return_html),
            OutputFormat::Markdown => format_structure_markdown(raw),
        };

        Ok(Prediction {
            result,
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
