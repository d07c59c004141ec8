//! Thumbnail generation for image uploads.

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("Thumbnail task failed: {0}")]
    Task(String),
}

/// Encoded thumbnail ready to be written to blob storage
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub content_type: String,
    /// File extension for the thumbnail key, without the dot
    pub extension: String,
}

/// Produces a thumbnail for an image upload
///
/// `Ok(None)` means no thumbnail is wanted for this input. Errors are reported by the
/// pipeline and never fail the upload.
#[async_trait]
pub trait Thumbnailer: Send + Sync {
    async fn generate(
        &self,
        data: Bytes,
        mime_type: &str,
    ) -> Result<Option<Thumbnail>, ThumbnailError>;
}

/// File extension for an image MIME type
pub(crate) fn extension_for_mime(mime_type: &str) -> String {
    let subtype = mime_type.split('/').nth(1).unwrap_or("");
    match subtype {
        "jpeg" | "pjpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        "x-icon" | "vnd.microsoft.icon" => "ico".to_string(),
        s if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) => s.to_string(),
        _ => "bin".to_string(),
    }
}

/// Uses the original bytes as the thumbnail
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughThumbnailer;

#[async_trait]
impl Thumbnailer for PassthroughThumbnailer {
    async fn generate(
        &self,
        data: Bytes,
        mime_type: &str,
    ) -> Result<Option<Thumbnail>, ThumbnailError> {
        Ok(Some(Thumbnail {
            data,
            content_type: mime_type.to_string(),
            extension: extension_for_mime(mime_type),
        }))
    }
}

/// Decodes the image, bounds it to `max_edge` pixels and re-encodes it as JPEG
#[cfg(feature = "thumbnails")]
#[derive(Debug, Clone, Copy)]
pub struct ResizingThumbnailer {
    max_edge: u32,
}

#[cfg(feature = "thumbnails")]
impl ResizingThumbnailer {
    pub fn new(max_edge: u32) -> Self {
        Self {
            max_edge: max_edge.max(1),
        }
    }

    fn render(data: &[u8], max_edge: u32) -> Result<Vec<u8>, ThumbnailError> {
        use image::{DynamicImage, GenericImageView, ImageFormat};
        use std::io::Cursor;

        let img = image::load_from_memory(data).map_err(|e| ThumbnailError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let img = if width > max_edge || height > max_edge {
            img.thumbnail(max_edge, max_edge)
        } else {
            img
        };

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buffer = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .map_err(|e| ThumbnailError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(feature = "thumbnails")]
#[async_trait]
impl Thumbnailer for ResizingThumbnailer {
    async fn generate(
        &self,
        data: Bytes,
        _mime_type: &str,
    ) -> Result<Option<Thumbnail>, ThumbnailError> {
        let max_edge = self.max_edge;
        let start = std::time::Instant::now();

        let encoded = tokio::task::spawn_blocking(move || Self::render(&data, max_edge))
            .await
            .map_err(|e| ThumbnailError::Task(e.to_string()))??;

        tracing::debug!(
            size_bytes = encoded.len(),
            max_edge,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail generated"
        );

        Ok(Some(Thumbnail {
            data: Bytes::from(encoded),
            content_type: "image/jpeg".to_string(),
            extension: "jpg".to_string(),
        }))
    }
}
