//! Medialib Database Layer
//!
//! This crate provides the catalog repository trait and its embedded and Postgres
//! implementations.

pub mod error;
pub mod factory;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;

// Re-export commonly used types
pub use error::{RepositoryError, RepositoryResult};
pub use factory::create_repository;
pub use memory::InMemoryCatalogRepository;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCatalogRepository;
pub use repository::CatalogRepository;
