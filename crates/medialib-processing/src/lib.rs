//! Medialib Processing Library
//!
//! This crate runs uploads end to end (validation, blob write, thumbnails, catalog insert
//! with progress reporting), deletes and edits records, and exposes the `MediaLibrary`
//! facade that wires every component together.
//!
//! # Features
//!
//! - `thumbnails` (default): resize image thumbnails with the `image` crate. Without it,
//!   the original image bytes are stored as the thumbnail.
//! - `postgres`, `storage-local`, `storage-s3` (default): backend passthroughs.

pub mod library;
pub mod lifecycle;
pub mod upload;
pub mod validator;

// Re-export commonly used types
pub use library::MediaLibrary;
pub use lifecycle::MediaLifecycleService;
pub use upload::{
    NoProgress, PassthroughThumbnailer, ProgressSink, Thumbnail, ThumbnailError, Thumbnailer,
    UploadFile, UploadHandle, UploadMetadata, UploadOptions, UploadPipeline, UploadStatus,
    UploadTask,
};
#[cfg(feature = "thumbnails")]
pub use upload::ResizingThumbnailer;
pub use validator::{UploadValidator, ValidatedUpload};
