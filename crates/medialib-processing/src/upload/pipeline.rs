//! Upload pipeline: validate → store original → thumbnail → catalog insert.
//!
//! Validation runs before any I/O. A failed blob write stops the upload before the catalog
//! is touched. Thumbnail failures are logged and never fail the upload. When the catalog
//! insert fails after the blobs were written, the orphaned keys are logged and, when
//! configured, deleted best-effort.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use medialib_catalog::CatalogView;
use medialib_core::{AppError, FileKind, LibraryConfig, MediaRecord, NewMediaRecord};
use medialib_db::CatalogRepository;
use medialib_storage::keys::{media_key, thumbnail_key};
use medialib_storage::{BlobReader, BlobStore, StorageResult, StoredBlob};
use tokio::sync::watch;
use tokio_util::io::InspectReader;
use uuid::Uuid;

use super::progress::{ProgressReporter, ProgressSink, THUMBNAIL_PHASE_END, WRITE_PHASE_END};
use super::task::{UploadHandle, UploadTask};
use super::thumbnail::Thumbnailer;
use super::types::{UploadFile, UploadMetadata};
use crate::validator::UploadValidator;

/// Pipeline settings taken from [`LibraryConfig`]
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub max_file_size: u64,
    pub cleanup_orphaned_blobs: bool,
    pub uploader_label: Option<String>,
}

impl UploadOptions {
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes,
            cleanup_orphaned_blobs: config.cleanup_orphaned_blobs,
            uploader_label: config.uploader_label.clone(),
        }
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self::from_config(&LibraryConfig::default())
    }
}

pub struct UploadPipeline {
    blob_store: Arc<dyn BlobStore>,
    repository: Arc<dyn CatalogRepository>,
    view: Arc<CatalogView>,
    thumbnailer: Arc<dyn Thumbnailer>,
    validator: UploadValidator,
    options: UploadOptions,
}

impl UploadPipeline {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        repository: Arc<dyn CatalogRepository>,
        view: Arc<CatalogView>,
        thumbnailer: Arc<dyn Thumbnailer>,
        options: UploadOptions,
    ) -> Self {
        Self {
            blob_store,
            repository,
            view,
            thumbnailer,
            validator: UploadValidator::new(options.max_file_size),
            options,
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Upload one file and add its record to the catalog view
    ///
    /// `progress` receives non-decreasing values and exactly one `1.0`, emitted after the
    /// record was created. Stores without incremental writes only see `0.0` and `1.0`.
    #[tracing::instrument(skip_all, fields(file_name = %file.file_name, size_bytes = file.size()))]
    pub async fn upload(
        &self,
        file: UploadFile,
        metadata: UploadMetadata,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<MediaRecord, AppError> {
        let start = Instant::now();
        let validated = self.validator.validate(&file, &metadata)?;

        let reporter = Arc::new(ProgressReporter::new(progress));
        let fine_grained = self.blob_store.supports_progress();
        reporter.report(0.0);

        let object_id = Uuid::new_v4();
        let key = media_key(object_id, &file.file_name);
        let original = self
            .write_original(
                &key,
                &validated.mime_type,
                file.data.clone(),
                fine_grained.then(|| Arc::clone(&reporter)),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to store upload");
                AppError::from(e)
            })?;

        if fine_grained {
            reporter.report(WRITE_PHASE_END);
        }

        let thumbnail = if validated.file_kind == FileKind::Image {
            self.store_thumbnail(object_id, file.data, &validated.mime_type)
                .await
        } else {
            None
        };

        if fine_grained {
            reporter.report(THUMBNAIL_PHASE_END);
        }

        let uploader_label = metadata
            .uploader_label
            .filter(|label| !label.trim().is_empty())
            .or_else(|| self.options.uploader_label.clone());

        let new_record = NewMediaRecord {
            title: validated.title,
            description: validated.description,
            file_name: file.file_name,
            mime_type: validated.mime_type,
            file_kind: validated.file_kind,
            file_size_bytes: validated.size_bytes,
            storage_key: original.key.clone(),
            storage_url: original.url.clone(),
            thumbnail_key: thumbnail.as_ref().map(|t| t.key.clone()),
            thumbnail_url: thumbnail.as_ref().map(|t| t.url.clone()),
            uploader_label,
            tags: validated.tags,
        };

        let record = match self.repository.create(new_record).await {
            Ok(record) => record,
            Err(e) => {
                let mut orphaned = vec![original.key];
                orphaned.extend(thumbnail.map(|t| t.key));
                self.handle_orphans(&orphaned, &e.to_string()).await;
                return Err(e.into());
            }
        };

        self.view.prepend(record.clone());
        reporter.complete();

        tracing::info!(
            record_id = %record.id,
            key = %record.storage_key,
            file_kind = %record.file_kind,
            thumbnail = record.thumbnail_key.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload completed"
        );

        Ok(record)
    }

    /// Run an upload on the tokio runtime
    ///
    /// The returned handle publishes status and progress. Dropping it lets the upload run
    /// to completion.
    pub fn spawn(self: &Arc<Self>, file: UploadFile, metadata: UploadMetadata) -> UploadHandle {
        let (sender, receiver) = watch::channel(UploadTask::new(file.file_name.clone()));
        let sender = Arc::new(sender);
        let pipeline = Arc::clone(self);

        let join = tokio::spawn(async move {
            sender.send_modify(|task| {
                if let Err(e) = task.begin() {
                    tracing::warn!(error = %e, "Upload task state not updated");
                }
            });

            let progress_sender = Arc::clone(&sender);
            let sink: Arc<dyn ProgressSink> = Arc::new(move |progress: f64| {
                progress_sender.send_modify(|task| task.set_progress(progress));
            });

            let result = pipeline.upload(file, metadata, sink).await;

            sender.send_modify(|task| {
                let transition = match &result {
                    Ok(record) => task.succeed(record.clone()),
                    Err(e) => task.fail(e),
                };
                if let Err(e) = transition {
                    tracing::warn!(error = %e, "Upload task state not updated");
                }
            });

            result
        });

        UploadHandle { receiver, join }
    }

    async fn write_original(
        &self,
        key: &str,
        content_type: &str,
        data: Bytes,
        reporter: Option<Arc<ProgressReporter>>,
    ) -> StorageResult<StoredBlob> {
        let Some(reporter) = reporter else {
            return self.blob_store.write(key, content_type, data).await;
        };

        let total = data.len() as u64;
        let mut written = 0u64;
        let reader = InspectReader::new(Cursor::new(data), move |chunk: &[u8]| {
            written += chunk.len() as u64;
            reporter.report_bytes(written, total);
        });
        let reader: BlobReader = Box::pin(reader);

        self.blob_store
            .write_stream(key, content_type, Some(total), reader)
            .await
    }

    async fn store_thumbnail(
        &self,
        object_id: Uuid,
        data: Bytes,
        mime_type: &str,
    ) -> Option<StoredBlob> {
        let thumbnail = match self.thumbnailer.generate(data, mime_type).await {
            Ok(Some(thumbnail)) => thumbnail,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    object_id = %object_id,
                    "Thumbnail generation failed, continuing without thumbnail"
                );
                return None;
            }
        };

        let key = thumbnail_key(object_id, &thumbnail.extension);
        match self
            .blob_store
            .write(&key, &thumbnail.content_type, thumbnail.data)
            .await
        {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %key,
                    "Failed to store thumbnail, continuing without thumbnail"
                );
                None
            }
        }
    }

    async fn handle_orphans(&self, keys: &[String], cause: &str) {
        tracing::error!(
            error = %cause,
            orphaned_keys = ?keys,
            cleanup = self.options.cleanup_orphaned_blobs,
            "Catalog insert failed after blob write"
        );

        if !self.options.cleanup_orphaned_blobs {
            return;
        }

        for key in keys {
            match self.blob_store.delete(key).await {
                Ok(()) => tracing::info!(key = %key, "Deleted orphaned blob"),
                Err(e) if e.is_not_found() => {}
                Err(e) => tracing::warn!(key = %key, error = %e, "Failed to delete orphaned blob"),
            }
        }
    }
}
