use medialib_core::{CatalogBackend, LibraryConfig};
use std::sync::Arc;

use crate::error::RepositoryResult;
use crate::memory::InMemoryCatalogRepository;
#[cfg(feature = "postgres")]
use crate::postgres::PostgresCatalogRepository;
use crate::repository::CatalogRepository;

/// Create a catalog repository based on configuration
pub async fn create_repository(
    config: &LibraryConfig,
) -> RepositoryResult<Arc<dyn CatalogRepository>> {
    match config.catalog_backend {
        CatalogBackend::Memory => {
            tracing::info!(backend = "memory", "Catalog repository initialized");
            Ok(Arc::new(InMemoryCatalogRepository::new()))
        }

        #[cfg(feature = "postgres")]
        CatalogBackend::Postgres => {
            let repo = PostgresCatalogRepository::connect(config).await?;
            tracing::info!(backend = "postgres", "Catalog repository initialized");
            Ok(Arc::new(repo))
        }

        #[cfg(not(feature = "postgres"))]
        CatalogBackend::Postgres => Err(crate::error::RepositoryError::Backend(
            "Postgres catalog backend not available (postgres feature not enabled)".to_string(),
        )),
    }
}
