//! Test helpers: failure-injecting wrappers around the in-memory backends.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use medialib_catalog::CatalogView;
use medialib_core::{MediaRecord, MediaUpdate, NewMediaRecord, StorageBackend};
use medialib_db::{
    CatalogRepository, InMemoryCatalogRepository, RepositoryError, RepositoryResult,
};
use medialib_processing::{
    MediaLibrary, PassthroughThumbnailer, ProgressSink, Thumbnail, ThumbnailError, Thumbnailer,
    UploadFile, UploadOptions, UploadPipeline,
};
use medialib_storage::{
    BlobReader, BlobStore, MemoryBlobStore, StorageError, StorageResult, StoredBlob,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Blob store that can be told to fail writes or deletes
pub struct FlakyBlobStore {
    pub inner: MemoryBlobStore,
    pub fail_writes: AtomicBool,
    pub fail_deletes: AtomicBool,
    /// Fail deletes only for keys under this prefix
    pub fail_delete_prefix: Mutex<Option<String>>,
    pub progress: bool,
    pub writes: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl FlakyBlobStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBlobStore::new(),
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_delete_prefix: Mutex::new(None),
            progress: true,
            writes: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Store without incremental write progress
    pub fn coarse() -> Self {
        Self {
            progress: false,
            ..Self::new()
        }
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_deletes_under(&self, prefix: &str) {
        *self.fail_delete_prefix.lock().unwrap() = Some(prefix.to_string());
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn write(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<StoredBlob> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("injected write failure".to_string()));
        }
        self.inner.write(key, content_type, data).await
    }

    async fn write_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: BlobReader,
    ) -> StorageResult<StoredBlob> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("injected write failure".to_string()));
        }
        self.inner
            .write_stream(key, content_type, content_length, reader)
            .await
    }

    async fn read(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.read(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let prefixed = self
            .fail_delete_prefix
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|prefix| key.starts_with(prefix));
        if prefixed || self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("injected delete failure".to_string()));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    fn supports_progress(&self) -> bool {
        self.progress
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Repository that can be told to fail creates or deletes
pub struct FlakyRepository {
    pub inner: InMemoryCatalogRepository,
    pub fail_creates: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub creates: AtomicUsize,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryCatalogRepository::new(),
            fail_creates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            creates: AtomicUsize::new(0),
        }
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRepository for FlakyRepository {
    async fn list(&self) -> RepositoryResult<Vec<MediaRecord>> {
        self.inner.list().await
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<MediaRecord>> {
        self.inner.get(id).await
    }

    async fn create(&self, record: NewMediaRecord) -> RepositoryResult<MediaRecord> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend("injected insert failure".to_string()));
        }
        self.inner.create(record).await
    }

    async fn update(&self, id: Uuid, update: MediaUpdate) -> RepositoryResult<MediaRecord> {
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend("injected delete failure".to_string()));
        }
        self.inner.delete(id).await
    }
}

/// Thumbnailer that always fails
pub struct BrokenThumbnailer;

#[async_trait]
impl Thumbnailer for BrokenThumbnailer {
    async fn generate(
        &self,
        _data: Bytes,
        _mime_type: &str,
    ) -> Result<Option<Thumbnail>, ThumbnailError> {
        Err(ThumbnailError::Decode("injected decode failure".to_string()))
    }
}

/// Everything a pipeline test needs to inspect
pub struct Harness {
    pub store: Arc<FlakyBlobStore>,
    pub repository: Arc<FlakyRepository>,
    pub view: Arc<CatalogView>,
    pub pipeline: Arc<UploadPipeline>,
}

impl Harness {
    pub fn new(store: FlakyBlobStore) -> Self {
        Self::with(store, Arc::new(PassthroughThumbnailer), UploadOptions::default())
    }

    pub fn with(
        store: FlakyBlobStore,
        thumbnailer: Arc<dyn Thumbnailer>,
        options: UploadOptions,
    ) -> Self {
        let store = Arc::new(store);
        let repository = Arc::new(FlakyRepository::new());
        let view = Arc::new(CatalogView::new(repository.clone()));
        let pipeline = Arc::new(UploadPipeline::new(
            store.clone(),
            repository.clone(),
            view.clone(),
            thumbnailer,
            options,
        ));
        Self {
            store,
            repository,
            view,
            pipeline,
        }
    }
}

/// Library over failure-injecting backends
pub fn library(store: Arc<FlakyBlobStore>, repository: Arc<FlakyRepository>) -> MediaLibrary {
    MediaLibrary::new(
        repository,
        store,
        Arc::new(PassthroughThumbnailer),
        UploadOptions::default(),
        24,
    )
}

/// Progress sink recording every value
pub fn recording_sink() -> (Arc<Mutex<Vec<f64>>>, Arc<dyn ProgressSink>) {
    let values = Arc::new(Mutex::new(Vec::new()));
    let sink_values = values.clone();
    let sink: Arc<dyn ProgressSink> =
        Arc::new(move |p: f64| sink_values.lock().unwrap().push(p));
    (values, sink)
}

pub fn jpeg(name: &str, size: usize) -> UploadFile {
    let mut data = vec![0u8; size];
    data[..3.min(size)].copy_from_slice(&[0xFF, 0xD8, 0xFF][..3.min(size)]);
    UploadFile::new(name, "image/jpeg", data)
}

pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, "application/pdf", b"%PDF-1.4 test".to_vec())
}
