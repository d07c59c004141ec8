//! Embedded catalog repository
//!
//! Keeps records in a shared map. Default backend when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use medialib_core::{MediaRecord, MediaUpdate, NewMediaRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::CatalogRepository;

#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    records: Arc<Mutex<HashMap<Uuid, MediaRecord>>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing records
    pub fn with_records(records: impl IntoIterator<Item = MediaRecord>) -> Self {
        let repo = Self::new();
        repo.records()
            .extend(records.into_iter().map(|r| (r.id, r)));
        repo
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<Uuid, MediaRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "select"))]
    async fn list(&self) -> RepositoryResult<Vec<MediaRecord>> {
        let mut records: Vec<MediaRecord> = self.records().values().cloned().collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<MediaRecord>> {
        Ok(self.records().get(&id).cloned())
    }

    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "media_items", db.operation = "insert")
    )]
    async fn create(&self, record: NewMediaRecord) -> RepositoryResult<MediaRecord> {
        record.check_invariants()?;

        let record = record.into_record(Uuid::new_v4(), Utc::now());
        let mut records = self.records();
        if records.contains_key(&record.id) {
            return Err(RepositoryError::Constraint(format!(
                "Duplicate media record id {}",
                record.id
            )));
        }
        records.insert(record.id, record.clone());

        tracing::debug!(record_id = %record.id, "Media record created");
        Ok(record)
    }

    #[tracing::instrument(
        skip(self, update),
        fields(db.table = "media_items", db.operation = "update")
    )]
    async fn update(&self, id: Uuid, update: MediaUpdate) -> RepositoryResult<MediaRecord> {
        let update = update.normalized()?;

        let mut records = self.records();
        let record = records.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        record.apply_update(&update, Utc::now());
        Ok(record.clone())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_items", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.records()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medialib_core::{FileKind, ValidationError};

    fn new_record(title: &str) -> NewMediaRecord {
        NewMediaRecord {
            title: title.to_string(),
            description: None,
            file_name: format!("{}.png", title),
            mime_type: "image/png".to_string(),
            file_kind: FileKind::Image,
            file_size_bytes: 42,
            storage_key: format!("media/{}.png", title),
            storage_url: format!("memory://media/{}.png", title),
            thumbnail_key: None,
            thumbnail_url: None,
            uploader_label: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let repo = InMemoryCatalogRepository::new();
        let a = repo.create(new_record("a")).await.unwrap();
        let b = repo.create(new_record("b")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get(a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_create_rejects_invariant_violations() {
        let repo = InMemoryCatalogRepository::new();
        let mut record = new_record("clip");
        record.file_kind = FileKind::Video;
        record.thumbnail_url = Some("memory://thumbnails/clip.jpg".to_string());

        let err = repo.create(record).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Validation(ValidationError::ThumbnailNotAllowed(FileKind::Video))
        ));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let repo = InMemoryCatalogRepository::new();
        let id = Uuid::new_v4();

        let err = repo.update(id, MediaUpdate::default()).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.delete(id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
