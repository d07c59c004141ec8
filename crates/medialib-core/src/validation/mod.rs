//! Validation modules

pub mod metadata;

use crate::models::FileKind;

pub use metadata::{
    ensure_unique_tags, normalize_tags, resolve_title, validate_description, MAX_DESCRIPTION_LENGTH,
    MAX_TAGS, MAX_TAG_LENGTH, MAX_TITLE_LENGTH,
};

/// Caller-input errors. Never retried; surfaced before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title exceeds maximum length of {max} characters")]
    TitleTooLong { max: usize },

    #[error("Description exceeds maximum length of {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("Too many tags: {count} (max: {max})")]
    TooManyTags { count: usize, max: usize },

    #[error("Tag '{tag}' exceeds maximum length of {max} characters")]
    TagTooLong { tag: String, max: usize },

    #[error("Duplicate tag: {0}")]
    DuplicateTag(String),

    #[error("Thumbnails are only allowed for images, not {0}")]
    ThumbnailNotAllowed(FileKind),

    #[error("Validation error: {0}")]
    Invalid(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(err: validator::ValidationErrors) -> Self {
        ValidationError::Invalid(err.to_string())
    }
}
