//! Metadata validation module
//!
//! Provides validation for user-editable record metadata:
//! - Title: non-empty after trimming, bounded length, defaults to the file name
//! - Description: bounded length
//! - Tags: trimmed, empty entries dropped, case-sensitive deduplication, count and length limits

use std::collections::HashSet;

use super::ValidationError;

/// Maximum length for titles (255 characters)
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum length for descriptions (5000 characters)
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Maximum number of tags per record (50 tags)
pub const MAX_TAGS: usize = 50;

/// Maximum length for a single tag (64 characters)
pub const MAX_TAG_LENGTH: usize = 64;

/// Resolve the display title for a new record.
///
/// A missing or blank requested title falls back to the original file name.
pub fn resolve_title(requested: Option<&str>, file_name: &str) -> Result<String, ValidationError> {
    let title = match requested.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => file_name.trim().to_string(),
    };

    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong {
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(title)
}

/// Trim a description; blank descriptions become `None`.
pub fn validate_description(
    description: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LENGTH,
        });
    }
    Ok(Some(description.to_string()))
}

/// Normalize a tag list: trim, drop empties, keep the first of each exact duplicate.
///
/// Order of first occurrence is preserved for display.
pub fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(ValidationError::TagTooLong {
                tag: tag.to_string(),
                max: MAX_TAG_LENGTH,
            });
        }
        if seen.insert(tag.to_string()) {
            normalized.push(tag.to_string());
        }
    }

    if normalized.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags {
            count: normalized.len(),
            max: MAX_TAGS,
        });
    }

    Ok(normalized)
}

/// Reject a tag list containing exact duplicates.
pub fn ensure_unique_tags(tags: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags {
        if !seen.insert(tag.as_str()) {
            return Err(ValidationError::DuplicateTag(tag.clone()));
        }
    }
    Ok(())
}
