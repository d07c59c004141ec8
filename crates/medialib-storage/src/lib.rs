//! Medialib Storage Library
//!
//! This crate provides the blob storage abstraction used by the upload pipeline and the
//! delete flow. It includes the `BlobStore` trait and implementations for an in-process
//! store, the local filesystem and S3.
//!
//! # Storage key format
//!
//! All backends use the same key layout:
//!
//! - **Originals**: `media/{object_id}.{ext}`
//! - **Thumbnails**: `thumbnails/{object_id}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod memory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
pub use medialib_core::StorageBackend;
pub use memory::MemoryBlobStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use traits::{BlobReader, BlobStore, StorageError, StorageResult, StoredBlob};
