//! Pure filter and sort over a record snapshot.

use chrono::{DateTime, Utc};
use medialib_core::{MediaRecord, QueryState, SortKey};
use std::cmp::Ordering;

/// Case-insensitive substring match on title, description or any tag.
///
/// An empty needle matches every record.
pub fn matches_search(record: &MediaRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();

    record.title.to_lowercase().contains(&needle)
        || record
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || record
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(&needle))
}

fn compare(sort_key: SortKey, a: &MediaRecord, b: &MediaRecord) -> Ordering {
    match sort_key {
        SortKey::Newest => b.uploaded_at.cmp(&a.uploaded_at),
        SortKey::Oldest => a.uploaded_at.cmp(&b.uploaded_at),
        SortKey::NameAsc => a.title.cmp(&b.title),
        SortKey::NameDesc => b.title.cmp(&a.title),
        SortKey::SizeAsc => a.file_size_bytes.cmp(&b.file_size_bytes),
        SortKey::SizeDesc => b.file_size_bytes.cmp(&a.file_size_bytes),
    }
}

/// Derive the visible list: search, kind and date filters combined with AND, then a
/// stable sort. Never fails and never mutates `records`.
pub fn apply_query(
    records: &[MediaRecord],
    query: &QueryState,
    now: DateTime<Utc>,
) -> Vec<MediaRecord> {
    let needle = query.search_text.to_lowercase();

    let mut results: Vec<MediaRecord> = records
        .iter()
        .filter(|r| matches_search(r, &needle))
        .filter(|r| query.kind_filter.matches(r.file_kind))
        .filter(|r| query.date_filter.matches(r.uploaded_at, now))
        .cloned()
        .collect();

    results.sort_by(|a, b| compare(query.sort_key, a, b));
    results
}
