use async_trait::async_trait;
use tokio::sync::RwLock;

use ocrgw_core::domain::RequestMetrics;
use ocrgw_core::error::MetricsError;
use ocrgw_core::ports::MetricsSink;

/// Sink used when metrics export is disabled.
pub struct NoopMetricsSink;

#[async_trait]
impl MetricsSink for NoopMetricsSink {
    async fn record(&self, _metrics: &RequestMetrics) -> Result<(), MetricsError> {
        Ok(())
    }
}

/// Keeps recorded metrics in memory.
///
/// Note: Data is lost on process restart.
pub struct InMemoryMetricsSink {
    records: RwLock<Vec<RequestMetrics>>,
}

impl InMemoryMetricsSink {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of everything recorded so far.
    pub async fn recorded(&self) -> Vec<RequestMetrics> {
        self.records.read().await.clone()
    }
}

impl Default for InMemoryMetricsSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsSink for InMemoryMetricsSink {
    async fn record(&self, metrics: &RequestMetrics) -> Result<(), MetricsError> {
        self.records.write().await.push(metrics.clone());
        Ok(())
    }
}
