use async_trait::async_trait;
use medialib_core::{MediaRecord, MediaUpdate, NewMediaRecord};
use uuid::Uuid;

use crate::error::RepositoryResult;

/// Persistent catalog of media records
///
/// Implementations assign `id` and `uploaded_at` on create and enforce the record
/// invariants checked by [`NewMediaRecord::check_invariants`].
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All records, newest first
    async fn list(&self) -> RepositoryResult<Vec<MediaRecord>>;

    /// Get a record by ID
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<MediaRecord>>;

    /// Insert a new record and return it with its assigned ID
    async fn create(&self, record: NewMediaRecord) -> RepositoryResult<MediaRecord>;

    /// Apply a normalized metadata edit
    ///
    /// Returns `RepositoryError::NotFound` when no record has this ID.
    async fn update(&self, id: Uuid, update: MediaUpdate) -> RepositoryResult<MediaRecord>;

    /// Delete a record
    ///
    /// Returns `RepositoryError::NotFound` when no record has this ID.
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
