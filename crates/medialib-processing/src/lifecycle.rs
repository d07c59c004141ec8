//! Media lifecycle operations: metadata edits and deletion of blobs and catalog rows.
//!
//! Deletion always starts from the catalog row as the repository sees it, then removes the
//! original blob, then the thumbnail, then the row. A failure on the original leaves
//! everything intact. Any failure after the original is gone surfaces as
//! [`AppError::PartialDelete`] with the row still in place, so retrying the delete finishes
//! the job.

use medialib_catalog::CatalogView;
use medialib_core::{AppError, MediaRecord, MediaUpdate};
use medialib_db::CatalogRepository;
use medialib_storage::BlobStore;
use std::sync::Arc;
use uuid::Uuid;

/// Service for record edits and deletion
pub struct MediaLifecycleService {
    blob_store: Arc<dyn BlobStore>,
    repository: Arc<dyn CatalogRepository>,
    view: Arc<CatalogView>,
}

impl MediaLifecycleService {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        repository: Arc<dyn CatalogRepository>,
        view: Arc<CatalogView>,
    ) -> Self {
        Self {
            blob_store,
            repository,
            view,
        }
    }

    /// Resolve a record from the view, falling back to the repository
    pub async fn find(&self, id: Uuid) -> Result<MediaRecord, AppError> {
        if let Some(record) = self.view.get(id) {
            return Ok(record);
        }
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Apply a metadata edit and refresh the view entry
    pub async fn update(&self, id: Uuid, update: MediaUpdate) -> Result<MediaRecord, AppError> {
        let update = update.normalized()?;
        let record = self.repository.update(id, update).await?;

        if !self.view.replace(record.clone()) {
            tracing::debug!(record_id = %id, "Updated record is not in the loaded view");
        }

        tracing::info!(record_id = %id, "Media record updated");
        Ok(record)
    }

    /// Delete a record's blobs, then its catalog row
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let Some(record) = self.repository.get(id).await? else {
            self.view.remove(id);
            return Err(not_found(id));
        };

        self.delete_blob(id, &record.storage_key).await?;

        if let Some(thumbnail_key) = &record.thumbnail_key {
            if let Err(e) = self.delete_blob(id, thumbnail_key).await {
                return Err(AppError::PartialDelete {
                    id,
                    message: format!("original deleted but thumbnail remains: {}", e),
                });
            }
        }

        match self.repository.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!(record_id = %id, "Catalog row was deleted concurrently");
                self.view.remove(id);
                return Err(not_found(id));
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    record_id = %id,
                    key = %record.storage_key,
                    "Blobs deleted but catalog row could not be removed"
                );
                return Err(AppError::PartialDelete {
                    id,
                    message: e.to_string(),
                });
            }
        }

        self.view.remove(id);
        tracing::info!(record_id = %id, key = %record.storage_key, "Media record deleted");
        Ok(())
    }

    async fn delete_blob(&self, id: Uuid, key: &str) -> Result<(), AppError> {
        match self.blob_store.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!(record_id = %id, key = %key, "Blob not found or already deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    record_id = %id,
                    key = %key,
                    "Failed to delete blob from storage"
                );
                Err(e.into())
            }
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Media record {} not found", id))
}
