//! Domain-level error types.

use thiserror::Error;

use crate::domain::PipelineKind;

/// Upload validation failures - the client sent something we cannot process.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file format: {ext}. Allowed: {allowed}")]
    UnsupportedExtension { ext: String, allowed: String },

    #[error("File too large: {size_kb:.1}KB. Maximum: {max_mb}MB")]
    TooLarge { size_kb: f64, max_mb: u64 },

    #[error("Failed to decode image: {0}")]
    Undecodable(String),

    #[error("The {pipeline} pipeline does not accept PDF input")]
    PdfNotSupported { pipeline: PipelineKind },

    #[error("Missing multipart field 'file'")]
    MissingFile,

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Failed to stage upload: {0}")]
    Staging(String),
}

/// Pipeline errors - the inference backend failed or is unreachable.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Pipeline unavailable: {0}")]
    Unavailable(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error("Backend response is not valid: {0}")]
    InvalidResponse(String),

    #[error("Failed to read staged input: {0}")]
    Io(String),
}

/// Metrics export errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics write failed: {0}")]
    Io(String),

    #[error("Metrics serialization failed: {0}")]
    Serialization(String),
}
