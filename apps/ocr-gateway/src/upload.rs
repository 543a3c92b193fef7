//! Multipart upload extraction and validation.

use std::collections::BTreeSet;
use std::io::Cursor;

use actix_multipart::Multipart;
use futures::StreamExt;

use ocrgw_core::domain::{FileKind, OutputFormat, PipelineKind, PredictOptions};
use ocrgw_core::error::UploadError;

use crate::config::parse_bool;

/// Text fields longer than this are rejected.
const MAX_TEXT_FIELD: usize = 1024;

/// Upload acceptance rules.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size_mb: u64,
    pub allowed_extensions: BTreeSet<String>,
}

impl UploadLimits {
    pub fn max_bytes(&self) -> usize {
        (self.max_file_size_mb as usize).saturating_mul(1024 * 1024)
    }

    fn allowed_list(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An upload form read in full, with its extension and size already checked.
#[derive(Debug)]
pub struct UploadForm {
    pub extension: String,
    pub file_kind: FileKind,
    pub bytes: Vec<u8>,
    pub compress: bool,
    pub options: PredictOptions,
}

impl UploadForm {
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Lowercased text after the last `.`; a name without a dot is its own extension.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or(file_name)
        .to_lowercase()
}

/// Read the multipart form, enforcing the extension and size limits while
/// streaming the file.
pub async fn read_form(
    mut payload: Multipart,
    limits: &UploadLimits,
) -> Result<UploadForm, UploadError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut compress = false;
    let mut options = PredictOptions::default();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| UploadError::InvalidField {
            field: "multipart".to_string(),
            reason: e.to_string(),
        })?;
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .unwrap_or_default()
                .to_string();

            let extension = file_extension(&file_name);
            if !limits.allowed_extensions.contains(&extension) {
                return Err(UploadError::UnsupportedExtension {
                    ext: extension,
                    allowed: limits.allowed_list(),
                });
            }

            let max_bytes = limits.max_bytes();
            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| UploadError::InvalidField {
                    field: name.clone(),
                    reason: e.to_string(),
                })?;
                bytes.extend_from_slice(&chunk);
                if bytes.len() > max_bytes {
                    return Err(UploadError::TooLarge {
                        size_kb: bytes.len() as f64 / 1024.0,
                        max_mb: limits.max_file_size_mb,
                    });
                }
            }

            file = Some((extension, bytes));
            continue;
        }

        let value = read_text(&mut field, &name).await?;
        match name.as_str() {
            "compress" => compress = parse_flag(&name, &value)?,
            "return_html" => options.return_html = parse_flag(&name, &value)?,
            "output_format" | "format" => {
                options.output_format = value
                    .parse::<OutputFormat>()
                    .map_err(|reason| UploadError::InvalidField {
                        field: name.clone(),
                        reason,
                    })?;
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let (extension, bytes) = file.ok_or(UploadError::MissingFile)?;

    Ok(UploadForm {
        file_kind: FileKind::from_extension(&extension),
        extension,
        bytes,
        compress,
        options,
    })
}

async fn read_text(field: &mut actix_multipart::Field, name: &str) -> Result<String, UploadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| UploadError::InvalidField {
            field: name.to_string(),
            reason: e.to_string(),
        })?;
        buf.extend_from_slice(&chunk);
        if buf.len() > MAX_TEXT_FIELD {
            return Err(UploadError::InvalidField {
                field: name.to_string(),
                reason: "value too long".to_string(),
            });
        }
    }

    String::from_utf8(buf).map_err(|_| UploadError::InvalidField {
        field: name.to_string(),
        reason: "value is not UTF-8".to_string(),
    })
}

fn parse_flag(name: &str, value: &str) -> Result<bool, UploadError> {
    parse_bool(value).ok_or_else(|| UploadError::InvalidField {
        field: name.to_string(),
        reason: format!("expected a boolean, got '{}'", value),
    })
}

/// Check the upload can be fed to `pipeline`: PDF support and a readable
/// header. Images are sniffed for format and dimensions only; pixel data is
/// left to the backend.
pub fn check_content(form: &UploadForm, pipeline: PipelineKind) -> Result<(), UploadError> {
    match form.file_kind {
        FileKind::Pdf if !pipeline.accepts_pdf() => {
            Err(UploadError::PdfNotSupported { pipeline })
        }
        FileKind::Pdf => {
            if form.bytes.starts_with(b"%PDF") {
                Ok(())
            } else {
                Err(UploadError::Undecodable("missing %PDF header".to_string()))
            }
        }
        FileKind::Image => {
            let (width, height) = image::ImageReader::new(Cursor::new(&form.bytes))
                .with_guessed_format()
                .map_err(|e| UploadError::Undecodable(e.to_string()))?
                .into_dimensions()
                .map_err(|e| UploadError::Undecodable(e.to_string()))?;
            tracing::debug!(width, height, "Image header accepted");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(extension: &str, bytes: &[u8]) -> UploadForm {
        UploadForm {
            extension: extension.to_string(),
            file_kind: FileKind::from_extension(extension),
            bytes: bytes.to_vec(),
            compress: false,
            options: PredictOptions::default(),
        }
    }

    fn png_bytes() -> Vec<u8> {
        png_of_size(4, 4)
    }

    fn png_of_size(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        image::RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 7]))
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("scan.PNG"), "png");
        assert_eq!(file_extension("archive.tar.pdf"), "pdf");
        assert_eq!(file_extension("README"), "readme");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_max_bytes() {
        let limits = UploadLimits {
            max_file_size_mb: 10,
            allowed_extensions: BTreeSet::new(),
        };
        assert_eq!(limits.max_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_check_content_images() {
        assert!(check_content(&form("png", &png_bytes()), PipelineKind::Ocrv5).is_ok());
        assert!(matches!(
            check_content(&form("jpg", b"not an image"), PipelineKind::Ocrv5),
            Err(UploadError::Undecodable(_))
        ));
    }

    #[test]
    fn test_check_content_reads_header_only() {
        let mut truncated = png_of_size(64, 64);
        truncated.truncate(truncated.len() - 20);
        assert!(check_content(&form("png", &truncated), PipelineKind::Structure).is_ok());

        let header_only = &png_bytes()[..8];
        assert!(matches!(
            check_content(&form("png", header_only), PipelineKind::Ocrv5),
            Err(UploadError::Undecodable(_))
        ));
    }

    #[test]
    fn test_check_content_pdfs() {
        let pdf = form("pdf", b"%PDF-1.7\n...");
        assert!(check_content(&pdf, PipelineKind::Vl).is_ok());
        assert!(check_content(&pdf, PipelineKind::Structure).is_ok());
        assert!(matches!(
            check_content(&pdf, PipelineKind::Ocrv5),
            Err(UploadError::PdfNotSupported { .. })
        ));
        assert!(matches!(
            check_content(&form("pdf", b"GIF89a"), PipelineKind::Vl),
            Err(UploadError::Undecodable(_))
        ));
    }
}
