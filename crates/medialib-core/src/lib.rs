//! Medialib Core Library
//!
//! This crate provides the canonical media record model, the MIME classifier, query
//! types, validation rules, error types and configuration shared by every medialib crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use config::{LibraryConfig, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    classify, format_file_size, DateFilter, FileKind, KindFilter, MediaRecord, MediaUpdate,
    NewMediaRecord, QueryState, SortKey,
};
pub use storage_types::{CatalogBackend, StorageBackend};
pub use validation::ValidationError;
