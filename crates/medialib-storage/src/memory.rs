//! In-process blob store
//!
//! Keeps blobs in a shared map. Used for development, tests and embedded catalogs
//! that do not need persistence.

use crate::keys::validate_key;
use crate::traits::{BlobReader, BlobStore, StorageError, StorageResult, StoredBlob};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::AsyncReadExt;

const DEFAULT_BASE_URL: &str = "memory://";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Blob store that keeps every object in memory
#[derive(Clone)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    base_url: String,
    quota_bytes: Option<u64>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            base_url: DEFAULT_BASE_URL.to_string(),
            quota_bytes: None,
        }
    }

    /// Limit the total number of stored bytes; writes past the limit fail with `QuotaExceeded`.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Total bytes currently stored
    pub fn used_bytes(&self) -> u64 {
        self.objects()
            .values()
            .map(|o| o.data.len() as u64)
            .sum()
    }

    /// Content type recorded for a key
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects().get(key).map(|o| o.content_type.clone())
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_url(&self, key: &str) -> String {
        if self.base_url.ends_with("://") {
            format!("{}{}", self.base_url, key)
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), key)
        }
    }

    fn insert(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<StoredBlob> {
        let size = data.len() as u64;
        let mut objects = self.objects();

        if let Some(quota) = self.quota_bytes {
            let replaced = objects.get(key).map(|o| o.data.len() as u64).unwrap_or(0);
            let used: u64 = objects.values().map(|o| o.data.len() as u64).sum();
            if used - replaced + size > quota {
                return Err(StorageError::QuotaExceeded { used, quota });
            }
        }

        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        drop(objects);

        tracing::debug!(key = %key, size_bytes = size, "Memory blob write successful");

        Ok(StoredBlob {
            key: key.to_string(),
            url: self.generate_url(key),
            size_bytes: size,
        })
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<StoredBlob> {
        validate_key(key)?;
        self.insert(key, content_type, data)
    }

    async fn write_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: BlobReader,
    ) -> StorageResult<StoredBlob> {
        validate_key(key)?;

        let mut buffer = Vec::with_capacity(content_length.unwrap_or(0) as usize);
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to read from stream: {}", e)))?;

        self.insert(key, content_type, Bytes::from(buffer))
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        validate_key(key)?;
        self.objects()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.objects()
            .remove(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        tracing::debug!(key = %key, "Memory blob delete successful");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self.objects().contains_key(key))
    }

    fn supports_progress(&self) -> bool {
        true
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
