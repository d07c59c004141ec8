use crate::keys::validate_key;
use crate::traits::{BlobReader, BlobStore, StorageError, StorageResult, StoredBlob};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use tokio::io::AsyncReadExt;

/// S3 blob store
///
/// Writes are single `put` calls, so no incremental progress is reported.
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for an S3 object
    ///
    /// Path-style `{endpoint}/{bucket}/{key}` for custom endpoints, otherwise the
    /// virtual-hosted AWS form.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    async fn put(&self, key: &str, bytes: Bytes) -> StorageResult<StoredBlob> {
        let size = bytes.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 write failed"
            );
            StorageError::WriteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 write successful"
        );

        Ok(StoredBlob {
            key: key.to_string(),
            url: self.generate_url(key),
            size_bytes: size,
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn write(
        &self,
        key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredBlob> {
        validate_key(key)?;
        self.put(key, data).await
    }

    async fn write_stream(
        &self,
        key: &str,
        _content_type: &str,
        content_length: Option<u64>,
        mut reader: BlobReader,
    ) -> StorageResult<StoredBlob> {
        validate_key(key)?;

        // Buffer the whole stream and upload in a single put.
        let mut buffer = Vec::with_capacity(content_length.unwrap_or(0) as usize);
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to read from stream: {}", e)))?;

        self.put(key, Bytes::from(buffer)).await
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 read failed"
                );
                StorageError::ReadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 read successful"
        );

        Ok(bytes)
    }

    /// S3 deletes are idempotent; a missing key is reported as `NotFound` only when
    /// a preceding `head` already shows it absent.
    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        if !self.exists(key).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
