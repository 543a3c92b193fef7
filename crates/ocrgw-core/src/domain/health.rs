use serde::{Deserialize, Serialize};

/// Readiness of a single pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Ready,
    Unavailable,
}

/// Health report for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineHealth {
    pub status: PipelineStatus,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vllm_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vllm_health: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineHealth {
    pub fn ready(endpoint: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Ready,
            model_loaded: true,
            endpoint: Some(endpoint.into()),
            vllm_endpoint: None,
            vllm_health: None,
            error: None,
        }
    }

    pub fn unavailable(endpoint: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: PipelineStatus::Unavailable,
            model_loaded: false,
            endpoint: Some(endpoint.into()),
            vllm_endpoint: None,
            vllm_health: None,
            error: Some(error.into()),
        }
    }

    /// Report for a pipeline that was never configured at startup.
    pub fn not_initialized() -> Self {
        Self {
            status: PipelineStatus::Unavailable,
            model_loaded: false,
            endpoint: None,
            vllm_endpoint: None,
            vllm_health: None,
            error: Some("Service not initialized".to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == PipelineStatus::Ready
    }
}

/// Aggregate gateway health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }

    /// All ready is healthy, some ready is degraded, none is unhealthy.
    /// An empty set is vacuously healthy.
    pub fn aggregate<'a>(reports: impl IntoIterator<Item = &'a PipelineHealth>) -> Self {
        let mut total = 0usize;
        let mut ready = 0usize;
        for report in reports {
            total += 1;
            if report.is_ready() {
                ready += 1;
            }
        }

        if ready == total {
            Self::Healthy
        } else if ready > 0 {
            Self::Degraded
        } else {
            Self::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_status() {
        let up = PipelineHealth::ready("http://ocr");
        let down = PipelineHealth::not_initialized();

        assert_eq!(OverallStatus::aggregate([&up, &up]), OverallStatus::Healthy);
        assert_eq!(OverallStatus::aggregate([&up, &down]), OverallStatus::Degraded);
        assert_eq!(OverallStatus::aggregate([&down, &down]), OverallStatus::Unhealthy);
        assert_eq!(OverallStatus::aggregate([]), OverallStatus::Healthy);
    }

    #[test]
    fn test_overall_status_names_match_serde() {
        for status in [
            OverallStatus::Healthy,
            OverallStatus::Degraded,
            OverallStatus::Unhealthy,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }

    #[test]
    fn test_not_initialized_serialization() {
        let value = serde_json::to_value(PipelineHealth::not_initialized()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "unavailable",
                "model_loaded": false,
                "error": "Service not initialized"
            })
        );
    }
}
