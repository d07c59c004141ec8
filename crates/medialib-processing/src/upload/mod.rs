//! Upload pipeline: validation, blob write, thumbnail, catalog insert and progress.

pub mod pipeline;
pub mod progress;
pub mod task;
pub mod thumbnail;
pub mod types;

pub use pipeline::{UploadOptions, UploadPipeline};
pub use progress::{NoProgress, ProgressReporter, ProgressSink};
pub use task::{InvalidTransition, UploadHandle, UploadStatus, UploadTask};
#[cfg(feature = "thumbnails")]
pub use thumbnail::ResizingThumbnailer;
pub use thumbnail::{PassthroughThumbnailer, Thumbnail, ThumbnailError, Thumbnailer};
pub use types::{UploadFile, UploadMetadata};
