//! # OCR Gateway Core
//!
//! The domain layer of the OCR gateway.
//! Pipeline abstractions, error types and the normalization of raw
//! model output into the gateway's uniform result shapes. No I/O lives here.

pub mod domain;
pub mod error;
pub mod normalize;
pub mod ports;

pub use error::{PipelineError, UploadError};
