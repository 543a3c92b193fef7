//! Pipeline implementations backed by HTTP serving endpoints.

mod client;
mod ocr;
mod structure;
mod vl;

pub use client::{ServingClient, ServingConfig, vllm_health_url};
pub use ocr::OcrPipeline;
pub use structure::{StructureOptions, StructurePipeline};
pub use vl::VlPipeline;
