//! Blob storage abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use medialib_core::AppError;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage quota exceeded: {used} of {quota} bytes in use")]
    QuotaExceeded { used: u64, quota: u64 },

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Blob not found: {}", key)),
            StorageError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Streaming input for [`BlobStore::write_stream`]
pub type BlobReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Location of a successfully written blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Internal identifier used to read or delete the blob
    pub key: String,
    /// URL a consumer can fetch the content from
    pub url: String,
    pub size_bytes: u64,
}

/// Blob storage abstraction trait
///
/// All storage backends (memory, local filesystem, S3) implement this trait so the
/// upload pipeline and delete flow never couple to a specific backend.
///
/// Keys are produced by [`crate::keys`]. A write to an existing key replaces it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a blob held in memory
    async fn write(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<StoredBlob>;

    /// Write a blob from a reader, consuming it until EOF
    ///
    /// Backends that report [`BlobStore::supports_progress`] pull from the reader
    /// incrementally, so a counting reader observes real transfer progress.
    async fn write_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: BlobReader,
    ) -> StorageResult<StoredBlob>;

    /// Read a blob by its key
    async fn read(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete a blob by its key
    ///
    /// Returns `StorageError::NotFound` when the backend can tell the key is absent.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a blob exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Whether writes can report incremental progress
    fn supports_progress(&self) -> bool {
        false
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
