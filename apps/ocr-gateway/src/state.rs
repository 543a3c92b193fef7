//! Application state - shared across all handlers.

use std::sync::Arc;

use ocrgw_core::domain::PipelineKind;
use ocrgw_core::ports::{MetricsSink, Pipeline};
use ocrgw_infra::{
    JsonlMetricsSink, NoopMetricsSink, OcrPipeline, ServingConfig, StructurePipeline,
    UploadStager, VlPipeline,
};

use crate::config::AppConfig;
use crate::upload::UploadLimits;

/// The pipelines built at startup. `None` means the pipeline is not initialized.
#[derive(Clone, Default)]
pub struct Pipelines {
    pub ocrv5: Option<Arc<dyn Pipeline>>,
    pub vl: Option<Arc<dyn Pipeline>>,
    pub structure: Option<Arc<dyn Pipeline>>,
}

impl Pipelines {
    pub fn get(&self, kind: PipelineKind) -> Option<&Arc<dyn Pipeline>> {
        match kind {
            PipelineKind::Ocrv5 => self.ocrv5.as_ref(),
            PipelineKind::Vl => self.vl.as_ref(),
            PipelineKind::Structure => self.structure.as_ref(),
        }
    }
}

/// Service identity shown on the root endpoint.
#[derive(Debug, Clone)]
pub struct ServiceMeta {
    pub name: String,
    pub description: String,
    pub api_prefix: String,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipelines: Pipelines,
    pub stager: UploadStager,
    pub limits: UploadLimits,
    pub metrics: Arc<dyn MetricsSink>,
    pub meta: ServiceMeta,
}

impl AppState {
    /// Build the application state from configuration.
    ///
    /// A pipeline whose endpoint is unset or fails to initialize is left out;
    /// its endpoint then answers 503 and health reports it unavailable.
    pub fn new(config: &AppConfig) -> Self {
        let backends = &config.backends;
        let serving = |endpoint: &String| ServingConfig {
            endpoint: endpoint.clone(),
            timeout: backends.timeout,
        };

        let ocrv5 = init_pipeline(
            PipelineKind::Ocrv5,
            backends.ocr_endpoint.as_ref(),
            |endpoint| OcrPipeline::new(&serving(endpoint)),
        );
        let structure = init_pipeline(
            PipelineKind::Structure,
            backends.structure_endpoint.as_ref(),
            |endpoint| StructurePipeline::new(&serving(endpoint), backends.structure),
        );
        let vl = init_pipeline(PipelineKind::Vl, backends.vl_endpoint.as_ref(), |endpoint| {
            let pipeline = VlPipeline::new(&serving(endpoint), backends.vllm_endpoint.clone())?;
            tracing::info!(vllm_endpoint = %pipeline.vllm_endpoint(), "VL pipeline uses vLLM server");
            Ok(pipeline)
        });

        let metrics: Arc<dyn MetricsSink> = if config.metrics.enabled {
            tracing::info!(dir = %config.metrics.export_dir.display(), "Metrics export enabled");
            Arc::new(JsonlMetricsSink::new(config.metrics.export_dir.clone()))
        } else {
            Arc::new(NoopMetricsSink)
        };

        let stager = UploadStager::new(config.upload_tmp_dir.clone());
        tracing::info!(dir = %stager.dir().display(), "Uploads staged in temp directory");

        tracing::info!("Application state initialized");

        Self {
            pipelines: Pipelines {
                ocrv5,
                vl,
                structure,
            },
            stager,
            limits: config.upload.clone(),
            metrics,
            meta: ServiceMeta {
                name: config.project_name.clone(),
                description: config.description.clone(),
                api_prefix: config.api_prefix.clone(),
            },
        }
    }
}

fn init_pipeline<P, F>(
    kind: PipelineKind,
    endpoint: Option<&String>,
    build: F,
) -> Option<Arc<dyn Pipeline>>
where
    P: Pipeline + 'static,
    F: FnOnce(&String) -> Result<P, ocrgw_core::PipelineError>,
{
    let Some(endpoint) = endpoint else {
        tracing::warn!(
            pipeline = %kind,
            "No endpoint configured. {} service not initialized.",
            kind.display_name()
        );
        return None;
    };

    tracing::info!(pipeline = %kind, endpoint = %endpoint, "Initializing {} service", kind.display_name());
    match build(endpoint) {
        Ok(pipeline) => {
            tracing::info!(pipeline = %kind, "{} service ready", kind.display_name());
            Some(Arc::new(pipeline) as Arc<dyn Pipeline>)
        }
        Err(e) => {
            tracing::error!(
                pipeline = %kind,
                "Failed to initialize {} service: {}",
                kind.display_name(),
                e
            );
            None
        }
    }
}
