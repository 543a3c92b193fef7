//! Error handling - maps failures to the gateway's JSON error body.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use ocrgw_core::error::{PipelineError, UploadError};
use ocrgw_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to [`ErrorResponse`] bodies.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
    Inference(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Inference(msg) => write!(f, "Inference failed: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Inference(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::ServiceUnavailable(detail) => ErrorResponse::service_unavailable(detail),
            AppError::Inference(detail) => {
                ErrorResponse::internal_error(format!("Inference failed: {}", detail))
            }
            AppError::Internal(detail) => {
                // Log internal errors; the client only sees a generic body
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::new(500, "Internal Server Error")
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Staging(msg) => AppError::Internal(format!("upload staging: {}", msg)),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Inference(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_upload_errors_are_bad_requests() {
        let err = AppError::from(UploadError::TooLarge {
            size_kb: 20480.5,
            max_mb: 10,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 400);
        assert_eq!(body["detail"], "File too large: 20480.5KB. Maximum: 10MB");
    }

    #[test]
    fn test_pipeline_errors_are_server_errors() {
        let err = AppError::from(PipelineError::Transport("connection refused".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let staging = AppError::from(UploadError::Staging("disk full".into()));
        assert_eq!(staging.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
