use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use ocrgw_core::domain::RequestMetrics;
use ocrgw_core::error::MetricsError;
use ocrgw_core::ports::MetricsSink;

/// Appends one JSON object per request to `metrics-YYYY-MM-DD.jsonl`.
pub struct JsonlMetricsSink {
    dir: PathBuf,
    // Serializes appends so concurrent lines never interleave.
    write_lock: Mutex<()>,
}

impl JsonlMetricsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn file_for(&self, metrics: &RequestMetrics) -> PathBuf {
        self.dir
            .join(format!("metrics-{}.jsonl", metrics.timestamp.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl MetricsSink for JsonlMetricsSink {
    async fn record(&self, metrics: &RequestMetrics) -> Result<(), MetricsError> {
        let mut line = serde_json::to_vec(metrics)
            .map_err(|e| MetricsError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MetricsError::Io(e.to_string()))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(metrics))
            .await
            .map_err(|e| MetricsError::Io(e.to_string()))?;

        file.write_all(&line)
            .await
            .map_err(|e| MetricsError::Io(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| MetricsError::Io(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ocrgw_core::domain::{InferenceSource, PipelineKind};

    fn sample(pipeline: PipelineKind) -> RequestMetrics {
        RequestMetrics {
            pipeline,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            total_time: 1.25,
            inference_time: 0.95,
            upload_time: Some(0.02),
            preprocess_time: Some(0.001),
            image_size_kb: 256.0,
            compressed: true,
            source: InferenceSource::Local,
        }
    }

    #[tokio::test]
    async fn test_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlMetricsSink::new(dir.path().join("metrics"));

        sink.record(&sample(PipelineKind::Ocrv5)).await.unwrap();
        sink.record(&sample(PipelineKind::Structure)).await.unwrap();

        let content =
            std::fs::read_to_string(dir.path().join("metrics/metrics-2026-03-14.jsonl")).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["pipeline"], "ocrv5");
        assert_eq!(lines[1]["pipeline"], "structure");
        assert_eq!(lines[1]["source"], "local");
    }
}
