//! Medialib Catalog
//!
//! In-memory query, filter, sort and pagination over the media catalog.

pub mod pagination;
pub mod query;
pub mod view;

pub use pagination::{Page, Paginator, DEFAULT_PAGE_SIZE};
pub use query::{apply_query, matches_search};
pub use view::CatalogView;
