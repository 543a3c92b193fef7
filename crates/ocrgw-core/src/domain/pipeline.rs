use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three document-understanding pipelines served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Text OCR (PP-OCRv5).
    Ocrv5,
    /// Vision-language document parser, backed by a vLLM server.
    Vl,
    /// Layout, table and formula structure recognition (PP-StructureV3).
    Structure,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [Self::Ocrv5, Self::Vl, Self::Structure];

    /// Wire key used in responses and health reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocrv5 => "ocrv5",
            Self::Vl => "vl",
            Self::Structure => "structure",
        }
    }

    /// Human-facing name used in logs and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ocrv5 => "OCRv5",
            Self::Vl => "VL",
            Self::Structure => "StructureV3",
        }
    }

    /// Whether the pipeline can take a PDF as input.
    pub fn accepts_pdf(&self) -> bool {
        !matches!(self, Self::Ocrv5)
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where inference physically runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceSource {
    Local,
    Docker,
}

impl InferenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Docker => "docker",
        }
    }
}

/// Kind of uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("pdf") {
            Self::Pdf
        } else {
            Self::Image
        }
    }

    /// File type code understood by the serving backends.
    pub fn serving_code(&self) -> u8 {
        match self {
            Self::Pdf => 0,
            Self::Image => 1,
        }
    }
}

/// Result rendering requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("expected 'json' or 'markdown', got '{}'", other)),
        }
    }
}

/// Per-request options forwarded to a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictOptions {
    pub output_format: OutputFormat,
    /// Only meaningful for the structure pipeline.
    pub return_html: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Json,
            return_html: true,
        }
    }
}

/// A validated upload staged on disk, ready for inference.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub path: PathBuf,
    pub file_kind: FileKind,
    pub options: PredictOptions,
}

/// Normalized pipeline output.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub result: serde_json::Value,
    /// Seconds spent in the backend call.
    pub inference_time: f64,
    pub source: InferenceSource,
}
