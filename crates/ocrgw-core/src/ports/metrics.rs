use async_trait::async_trait;

use crate::domain::RequestMetrics;
use crate::error::MetricsError;

/// Metrics sink - where per-request metrics are exported.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn record(&self, metrics: &RequestMetrics) -> Result<(), MetricsError>;
}
