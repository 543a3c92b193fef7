//! # OCR Gateway Infrastructure
//!
//! Concrete implementations of the ports defined in `ocrgw-core`.
//!
//! - [`pipelines`] - HTTP clients for the OCRv5, VL and StructureV3 serving backends
//! - [`staging`] - temp-file staging of validated uploads
//! - [`metrics`] - per-request metrics sinks (JSON lines on disk, in-memory, no-op)

pub mod metrics;
pub mod pipelines;
pub mod staging;

// Re-exports
pub use metrics::{InMemoryMetricsSink, JsonlMetricsSink, NoopMetricsSink};
pub use pipelines::{
    OcrPipeline, ServingClient, ServingConfig, StructureOptions, StructurePipeline, VlPipeline,
};
pub use staging::{StagedUpload, UploadStager};
