//! Temp-file staging of validated uploads.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use ocrgw_core::error::UploadError;

/// Writes uploads to named temp files so pipelines can read them by path.
#[derive(Debug, Clone)]
pub struct UploadStager {
    dir: PathBuf,
}

impl UploadStager {
    /// Stage into `dir`, or the system temp directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a fresh `ocrgw-*.{extension}` file.
    pub async fn stage(&self, bytes: &[u8], extension: &str) -> Result<StagedUpload, UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Staging(e.to_string()))?;

        let file = tempfile::Builder::new()
            .prefix("ocrgw-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.dir)
            .map_err(|e| UploadError::Staging(e.to_string()))?;

        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(|e| UploadError::Staging(e.to_string()))?;

        tracing::debug!(path = %file.path().display(), size = bytes.len(), "Upload staged");

        Ok(StagedUpload { file })
    }
}

/// A staged upload. The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
