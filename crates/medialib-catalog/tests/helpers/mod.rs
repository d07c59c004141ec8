//! Test helpers: record fixtures and scripted repositories.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use medialib_core::{FileKind, MediaRecord, MediaUpdate, NewMediaRecord};
use medialib_db::{CatalogRepository, RepositoryError, RepositoryResult};
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

pub fn record(title: &str, kind: FileKind, size: u64, uploaded_at: DateTime<Utc>) -> MediaRecord {
    NewMediaRecord {
        title: title.to_string(),
        description: None,
        file_name: format!("{}.bin", title),
        mime_type: "application/octet-stream".to_string(),
        file_kind: kind,
        file_size_bytes: size,
        storage_key: format!("media/{}.bin", Uuid::new_v4()),
        storage_url: format!("memory://media/{}.bin", title),
        thumbnail_key: None,
        thumbnail_url: None,
        uploader_label: None,
        tags: vec![],
    }
    .into_record(Uuid::new_v4(), uploaded_at)
}

/// `count` records with distinct titles, sizes and upload times
pub fn sample_records(count: usize) -> Vec<MediaRecord> {
    let now = Utc::now();
    let kinds = [
        FileKind::Image,
        FileKind::Video,
        FileKind::Audio,
        FileKind::Document,
        FileKind::Other,
    ];
    (0..count)
        .map(|i| {
            let mut r = record(
                &format!("File {:03}", i),
                kinds[i % kinds.len()],
                (i as u64 + 1) * 1000,
                now - Duration::hours(i as i64 * 13),
            );
            if i % 3 == 0 {
                r.description = Some(format!("Holiday batch {}", i));
            }
            if i % 4 == 0 {
                r.tags = vec!["Family".to_string()];
            }
            r
        })
        .collect()
}

/// One scripted `list` response
pub struct ListResponse {
    pub delay_ms: u64,
    pub result: Result<Vec<MediaRecord>, String>,
}

/// Repository whose `list` calls replay a script in order
pub struct ScriptedRepository {
    responses: Mutex<VecDeque<ListResponse>>,
}

impl ScriptedRepository {
    pub fn new(responses: Vec<ListResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl CatalogRepository for ScriptedRepository {
    async fn list(&self) -> RepositoryResult<Vec<MediaRecord>> {
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected list call");
        if response.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(response.delay_ms)).await;
        }
        response.result.map_err(RepositoryError::Backend)
    }

    async fn get(&self, _id: Uuid) -> RepositoryResult<Option<MediaRecord>> {
        Ok(None)
    }

    async fn create(&self, _record: NewMediaRecord) -> RepositoryResult<MediaRecord> {
        Err(RepositoryError::Backend("read-only".to_string()))
    }

    async fn update(&self, id: Uuid, _update: MediaUpdate) -> RepositoryResult<MediaRecord> {
        Err(RepositoryError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        Err(RepositoryError::NotFound(id))
    }
}
