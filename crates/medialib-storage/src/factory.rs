#[cfg(feature = "storage-local")]
use crate::LocalBlobStore;
#[cfg(feature = "storage-s3")]
use crate::S3BlobStore;
use crate::{BlobStore, MemoryBlobStore, StorageBackend, StorageError, StorageResult};
use medialib_core::LibraryConfig;
use std::sync::Arc;

/// Create a blob store based on configuration
pub async fn create_blob_store(config: &LibraryConfig) -> StorageResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.storage_backend {
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            Arc::new(S3BlobStore::new(bucket, region, config.s3_endpoint.clone())?)
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => {
            return Err(StorageError::ConfigError(
                "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
            ))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            Arc::new(LocalBlobStore::new(base_path, base_url).await?)
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => {
            return Err(StorageError::ConfigError(
                "Local storage backend not available (storage-local feature not enabled)"
                    .to_string(),
            ))
        }
    };

    tracing::info!(backend = %store.backend_type(), "Blob store initialized");
    Ok(store)
}
