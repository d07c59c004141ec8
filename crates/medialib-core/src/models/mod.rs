//! Data models shared by the catalog, storage and upload crates.

mod kind;
mod media;
mod query;

pub use kind::{classify, FileKind};
pub use media::{format_file_size, MediaRecord, MediaUpdate, NewMediaRecord};
pub use query::{DateFilter, KindFilter, QueryState, SortKey};
