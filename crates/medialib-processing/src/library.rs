//! Media library facade.
//!
//! Wires a catalog repository, a blob store, the catalog view, the upload pipeline and the
//! lifecycle service behind one handle. Every dependency is injected; nothing is global.

use std::sync::Arc;

use medialib_catalog::{CatalogView, Page};
use medialib_core::{AppError, LibraryConfig, MediaRecord, MediaUpdate, QueryState};
use medialib_db::{create_repository, CatalogRepository};
use medialib_storage::{create_blob_store, BlobStore};
use uuid::Uuid;

use crate::lifecycle::MediaLifecycleService;
use crate::upload::pipeline::{UploadOptions, UploadPipeline};
use crate::upload::progress::{NoProgress, ProgressSink};
use crate::upload::task::UploadHandle;
use crate::upload::thumbnail::Thumbnailer;
use crate::upload::types::{UploadFile, UploadMetadata};

pub struct MediaLibrary {
    view: Arc<CatalogView>,
    pipeline: Arc<UploadPipeline>,
    lifecycle: MediaLifecycleService,
}

impl MediaLibrary {
    /// Build a library from explicit parts
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        blob_store: Arc<dyn BlobStore>,
        thumbnailer: Arc<dyn Thumbnailer>,
        options: UploadOptions,
        page_size: usize,
    ) -> Self {
        let view = Arc::new(CatalogView::with_page_size(
            Arc::clone(&repository),
            page_size,
        ));
        let pipeline = Arc::new(UploadPipeline::new(
            Arc::clone(&blob_store),
            Arc::clone(&repository),
            Arc::clone(&view),
            thumbnailer,
            options,
        ));
        let lifecycle =
            MediaLifecycleService::new(blob_store, repository, Arc::clone(&view));

        Self {
            view,
            pipeline,
            lifecycle,
        }
    }

    /// Build a library from configuration, creating the configured backends
    pub async fn from_config(config: &LibraryConfig) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let repository = create_repository(config).await?;
        let blob_store = create_blob_store(config).await?;

        tracing::info!(
            environment = %config.environment,
            storage_backend = %config.storage_backend,
            catalog_backend = %config.catalog_backend,
            page_size = config.page_size,
            "Media library initialized"
        );

        Ok(Self::new(
            repository,
            blob_store,
            default_thumbnailer(config),
            UploadOptions::from_config(config),
            config.page_size,
        ))
    }

    pub fn view(&self) -> &Arc<CatalogView> {
        &self.view
    }

    pub fn pipeline(&self) -> &Arc<UploadPipeline> {
        &self.pipeline
    }

    /// Fetch the catalog and reset pagination
    pub async fn load(&self) -> Result<Arc<Vec<MediaRecord>>, AppError> {
        self.view.load().await
    }

    /// Filter and sort the loaded catalog
    pub fn query(&self, query: &QueryState) -> Vec<MediaRecord> {
        self.view.apply_query(query)
    }

    pub fn set_query(&self, query: QueryState) -> Page {
        self.view.set_query(query)
    }

    pub fn load_more(&self) -> Page {
        self.view.load_more()
    }

    /// Look a record up in the loaded view, then in the repository
    pub async fn get(&self, id: Uuid) -> Result<MediaRecord, AppError> {
        self.lifecycle.find(id).await
    }

    pub async fn upload(
        &self,
        file: UploadFile,
        metadata: UploadMetadata,
    ) -> Result<MediaRecord, AppError> {
        self.pipeline
            .upload(file, metadata, Arc::new(NoProgress))
            .await
    }

    pub async fn upload_with_progress(
        &self,
        file: UploadFile,
        metadata: UploadMetadata,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<MediaRecord, AppError> {
        self.pipeline.upload(file, metadata, progress).await
    }

    /// Start an upload in the background
    pub fn spawn_upload(&self, file: UploadFile, metadata: UploadMetadata) -> UploadHandle {
        self.pipeline.spawn(file, metadata)
    }

    pub async fn update(&self, id: Uuid, update: MediaUpdate) -> Result<MediaRecord, AppError> {
        self.lifecycle.update(id, update).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.lifecycle.delete(id).await
    }
}

#[cfg(feature = "thumbnails")]
fn default_thumbnailer(config: &LibraryConfig) -> Arc<dyn Thumbnailer> {
    Arc::new(crate::upload::thumbnail::ResizingThumbnailer::new(
        config.thumbnail_max_edge,
    ))
}

#[cfg(not(feature = "thumbnails"))]
fn default_thumbnailer(_config: &LibraryConfig) -> Arc<dyn Thumbnailer> {
    Arc::new(crate::upload::thumbnail::PassthroughThumbnailer)
}
