//! Standardized API response types.

use serde::{Deserialize, Serialize};

/// Uniform response of every recognition endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub success: bool,
    /// `ocrv5`, `vl` or `structure`.
    pub pipeline: String,
    pub result: serde_json::Value,
    pub metrics: MetricsBody,
}

impl OcrResponse {
    pub fn ok(
        pipeline: impl Into<String>,
        result: serde_json::Value,
        metrics: MetricsBody,
    ) -> Self {
        Self {
            success: true,
            pipeline: pipeline.into(),
            result,
            metrics,
        }
    }
}

/// Timing figures reported with each recognition result. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBody {
    pub total_time: f64,
    pub inference_time: f64,
    pub upload_time: Option<f64>,
    pub preprocess_time: Option<f64>,
    pub image_size_kb: f64,
    pub compressed: bool,
    /// `local` or `docker`.
    pub source: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,

    /// A short, human-readable summary of the problem.
    pub error: String,

    /// The HTTP status code.
    pub code: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(500, "Internal Server Error").with_detail(detail)
    }

    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new(503, "Service Unavailable").with_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::bad_request("Unsupported file format: gif"))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": "Bad Request",
                "code": 400,
                "detail": "Unsupported file format: gif"
            })
        );
    }

    #[test]
    fn test_ocr_response_keeps_null_optionals() {
        let metrics = MetricsBody {
            total_time: 1.0,
            inference_time: 0.5,
            upload_time: Some(0.1),
            preprocess_time: None,
            image_size_kb: 12.5,
            compressed: false,
            source: "local".to_string(),
        };
        let body = serde_json::to_value(OcrResponse::ok("ocrv5", serde_json::json!({}), metrics))
            .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["pipeline"], "ocrv5");
        assert!(body["metrics"]["preprocess_time"].is_null());
    }
}
