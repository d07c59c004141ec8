//! Types for the upload pipeline.

use bytes::Bytes;
use medialib_core::{AppError, ValidationError};
use std::path::Path;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Source file handed to the pipeline
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Read a local file, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ValidationError::InvalidFilename(path.display().to_string()))?
            .to_string();

        let data = tokio::fs::read(path).await.map_err(|e| AppError::InternalWithSource {
            message: format!("Failed to read {}", path.display()),
            source: e.into(),
        })?;

        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        Ok(Self {
            file_name,
            mime_type,
            data: Bytes::from(data),
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Trimmed, lowercased MIME type; blank becomes `application/octet-stream`
    pub fn normalized_mime_type(&self) -> String {
        let mime = self.mime_type.trim().to_lowercase();
        if mime.is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime
        }
    }
}

/// Metadata requested by the uploader
#[derive(Clone, Debug, Default)]
pub struct UploadMetadata {
    /// Defaults to the file name when missing or blank
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Overrides the configured uploader label
    pub uploader_label: Option<String>,
}

impl UploadMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}
