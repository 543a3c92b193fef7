//! Application configuration loaded from environment variables.

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ocrgw_infra::StructureOptions;

use crate::upload::UploadLimits;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub project_name: String,
    pub description: String,
    pub cors_origins: Vec<String>,
    pub upload: UploadLimits,
    pub upload_tmp_dir: Option<PathBuf>,
    pub backends: BackendConfig,
    pub metrics: MetricsConfig,
}

/// Serving endpoints of the three pipelines. An unset endpoint leaves that
/// pipeline uninitialized.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub ocr_endpoint: Option<String>,
    pub vl_endpoint: Option<String>,
    pub structure_endpoint: Option<String>,
    pub vllm_endpoint: String,
    pub timeout: Duration,
    pub structure: StructureOptions,
}

/// Per-request metrics export.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str, default: bool| {
            get(key)
                .map(|v| parse_bool(&v).unwrap_or(default))
                .unwrap_or(default)
        };
        let endpoint = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let upload = UploadLimits {
            max_file_size_mb: get("MAX_FILE_SIZE_MB")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            allowed_extensions: get("ALLOWED_EXTENSIONS")
                .map(|s| parse_list(&s).map(|e| e.to_lowercase()).collect())
                .unwrap_or_else(default_extensions),
        };

        let backends = BackendConfig {
            ocr_endpoint: endpoint("OCR_ENDPOINT"),
            vl_endpoint: endpoint("VL_ENDPOINT"),
            structure_endpoint: endpoint("STRUCTURE_ENDPOINT"),
            vllm_endpoint: get("VLLM_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:8118/v1".to_string()),
            timeout: Duration::from_secs(
                get("VLLM_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            structure: StructureOptions {
                use_table_recognition: flag("STRUCTURE_USE_TABLE_RECOGNITION", true),
                use_formula_recognition: flag("STRUCTURE_USE_FORMULA_RECOGNITION", true),
                use_region_detection: flag("STRUCTURE_USE_REGION_DETECTION", true),
            },
        };

        Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(8090),
            api_prefix: get("API_V1_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "/api/v1".to_string()),
            project_name: get("PROJECT_NAME")
                .unwrap_or_else(|| "OCR Multi-Pipeline API".to_string()),
            description: get("PROJECT_DESCRIPTION").unwrap_or_else(|| {
                "Unified OCR gateway for the OCRv5, VL and StructureV3 pipelines".to_string()
            }),
            cors_origins: get("CORS_ORIGINS")
                .map(|s| parse_list(&s).map(String::from).collect())
                .unwrap_or_else(|| {
                    vec![
                        "http://localhost:3000".to_string(),
                        "http://localhost:5173".to_string(),
                    ]
                }),
            upload,
            upload_tmp_dir: get("UPLOAD_TMP_DIR").map(PathBuf::from),
            backends,
            metrics: MetricsConfig {
                enabled: flag("ENABLE_METRICS", true),
                export_dir: PathBuf::from(
                    get("METRICS_EXPORT_DIR").unwrap_or_else(|| "./metrics".to_string()),
                ),
            },
        }
    }
}

fn default_extensions() -> BTreeSet<String> {
    ["jpg", "jpeg", "png", "bmp", "pdf"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Comma-separated list, blanks dropped.
fn parse_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Loose boolean parsing shared by env vars and form fields.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8090);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.upload.max_file_size_mb, 10);
        assert!(config.upload.allowed_extensions.contains("bmp"));
        assert_eq!(config.upload.allowed_extensions.len(), 5);
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.backends.ocr_endpoint.is_none());
        assert_eq!(config.backends.vllm_endpoint, "http://localhost:8118/v1");
        assert_eq!(config.backends.timeout, Duration::from_secs(30));
        assert!(config.backends.structure.use_formula_recognition);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("API_V1_PREFIX", "/ocr/"),
            ("ALLOWED_EXTENSIONS", "PNG, pdf,,"),
            ("OCR_ENDPOINT", " http://ocr:8080/ocr "),
            ("VL_ENDPOINT", ""),
            ("STRUCTURE_USE_FORMULA_RECOGNITION", "off"),
            ("ENABLE_METRICS", "0"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(config.api_prefix, "/ocr");
        assert_eq!(
            config.upload.allowed_extensions,
            BTreeSet::from(["pdf".to_string(), "png".to_string()])
        );
        assert_eq!(config.backends.ocr_endpoint.as_deref(), Some("http://ocr:8080/ocr"));
        assert!(config.backends.vl_endpoint.is_none());
        assert!(!config.backends.structure.use_formula_recognition);
        assert!(!config.metrics.enabled);
        assert_eq!(config.cors_origins, vec!["https://app.example.com".to_string()]);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" no "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
