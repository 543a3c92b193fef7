//! Thin reqwest wrapper around a model serving endpoint.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use serde_json::{Map, Value};

use ocrgw_core::domain::PipelineInput;
use ocrgw_core::error::PipelineError;

/// Timeout for health probes, independent of the inference timeout.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 512;

/// Serving endpoint configuration.
#[derive(Debug, Clone)]
pub struct ServingConfig {
    /// Full URL of the inference route, e.g. `http://localhost:8080/ocr`.
    pub endpoint: String,
    /// Timeout for a single inference request.
    pub timeout: Duration,
}

/// HTTP client for one serving endpoint.
///
/// Inference posts the staged file base64-encoded as `{"file", "fileType"}`
/// plus any pipeline-specific flags, and returns the raw JSON answer.
pub struct ServingClient {
    endpoint: String,
    health_url: String,
    client: reqwest::Client,
}

impl ServingClient {
    pub fn new(config: &ServingConfig) -> Result<Self, PipelineError> {
        let health_url = serving_health_url(&config.endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            health_url,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a staged upload for inference.
    pub async fn infer(
        &self,
        input: &PipelineInput,
        flags: Map<String, Value>,
    ) -> Result<Value, PipelineError> {
        let bytes = tokio::fs::read(&input.path)
            .await
            .map_err(|e| PipelineError::Io(format!("{}: {}", input.path.display(), e)))?;

        let mut body = Map::new();
        body.insert("file".to_string(), Value::String(STANDARD.encode(&bytes)));
        body.insert(
            "fileType".to_string(),
            Value::from(input.file_kind.serving_code()),
        );
        body.extend(flags);

        tracing::debug!(
            endpoint = %self.endpoint,
            size = bytes.len(),
            "Sending inference request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if let Some((cut, _)) = text.char_indices().nth(MAX_ERROR_BODY) {
                text.truncate(cut);
            }
            return Err(PipelineError::Backend {
                status: status.as_u16(),
                body: text,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PipelineError::InvalidResponse(e.to_string()))
    }

    /// Probe the serving process' `/health` route.
    pub async fn is_healthy(&self) -> bool {
        probe(&self.client, &self.health_url).await
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }
}

/// GET `url` and report whether it answered 200.
pub(crate) async fn probe(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).timeout(HEALTH_TIMEOUT).send().await {
        Ok(response) => response.status() == reqwest::StatusCode::OK,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Health probe failed");
            false
        }
    }
}

/// `/health` on the same host as the inference route.
fn serving_health_url(endpoint: &str) -> Result<String, PipelineError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| PipelineError::Unavailable(format!("invalid endpoint '{}': {}", endpoint, e)))?;
    url.set_path("/health");
    url.set_query(None);
    Ok(url.to_string())
}

/// Health route of a vLLM server given its OpenAI-style base URL.
///
/// The trailing `/v1` path segment is dropped: `http://host:8118/v1` probes
/// `http://host:8118/health`.
pub fn vllm_health_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    let base = base.strip_suffix("/v1").unwrap_or(base);
    format!("{}/health", base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use httpmock::prelude::*;
    use ocrgw_core::domain::{FileKind, PredictOptions};

    fn staged_pdf() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.7 fake").unwrap();
        file
    }

    fn client(endpoint: String) -> ServingClient {
        ServingClient::new(&ServingConfig {
            endpoint,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn input(file: &tempfile::NamedTempFile) -> PipelineInput {
        PipelineInput {
            path: file.path().to_path_buf(),
            file_kind: FileKind::Pdf,
            options: PredictOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/layout-parsing")
                    .json_body_partial(r#"{"fileType": 0}"#);
                then.status(200).body("<html>gateway page</html>");
            })
            .await;

        let file = staged_pdf();
        let err = client(server.url("/layout-parsing"))
            .infer(&input(&file), Map::new())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, PipelineError::InvalidResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let file = staged_pdf();
        let serving = client(format!("http://127.0.0.1:{}/ocr", port));
        let err = serving.infer(&input(&file), Map::new()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Transport(_)), "got {err:?}");
        assert!(!serving.is_healthy().await);
    }

    #[tokio::test]
    async fn test_error_body_is_truncated() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/ocr");
                then.status(502).body("e".repeat(MAX_ERROR_BODY + 100));
            })
            .await;

        let file = staged_pdf();
        let err = client(server.url("/ocr"))
            .infer(&input(&file), Map::new())
            .await
            .unwrap_err();

        match err {
            PipelineError::Backend { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_vllm_health_url() {
        assert_eq!(vllm_health_url("http://localhost:8118/v1"), "http://localhost:8118/health");
        assert_eq!(vllm_health_url("http://localhost:8118/v1/"), "http://localhost:8118/health");
        assert_eq!(vllm_health_url("http://localhost:8118"), "http://localhost:8118/health");
        // Only a whole trailing segment is removed.
        assert_eq!(vllm_health_url("http://vllm-host:81"), "http://vllm-host:81/health");
    }

    #[test]
    fn test_serving_health_url() {
        assert_eq!(
            serving_health_url("http://127.0.0.1:8080/layout-parsing?x=1").unwrap(),
            "http://127.0.0.1:8080/health"
        );
        assert!(serving_health_url("not a url").is_err());
    }
}
