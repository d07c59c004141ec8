use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::kind::FileKind;
use crate::validation::{self, ValidationError};

/// Catalog entity for one uploaded file.
///
/// Field names serialize in camelCase; they are the contract exposed to UI and API layers
/// regardless of backend column naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub file_kind: FileKind,
    pub file_size_bytes: u64,
    pub storage_key: String,
    pub storage_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_label: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MediaRecord {
    /// Apply a normalized edit. Only title, description and tags are mutable.
    ///
    /// `last_modified_at` is clamped so it never precedes `uploaded_at`.
    pub fn apply_update(&mut self, update: &MediaUpdate, now: DateTime<Utc>) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        self.last_modified_at = Some(now.max(self.uploaded_at));
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Fields supplied to the catalog when a record is created.
///
/// `id` and `uploaded_at` are assigned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaRecord {
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub file_kind: FileKind,
    pub file_size_bytes: u64,
    pub storage_key: String,
    pub storage_url: String,
    pub thumbnail_key: Option<String>,
    pub thumbnail_url: Option<String>,
    pub uploader_label: Option<String>,
    pub tags: Vec<String>,
}

impl NewMediaRecord {
    /// Check the record-level invariants a repository must refuse to persist.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.file_kind != FileKind::Image
            && (self.thumbnail_url.is_some() || self.thumbnail_key.is_some())
        {
            return Err(ValidationError::ThumbnailNotAllowed(self.file_kind));
        }
        validation::ensure_unique_tags(&self.tags)
    }

    pub fn into_record(self, id: Uuid, uploaded_at: DateTime<Utc>) -> MediaRecord {
        MediaRecord {
            id,
            title: self.title,
            description: self.description,
            file_name: self.file_name,
            mime_type: self.mime_type,
            file_kind: self.file_kind,
            file_size_bytes: self.file_size_bytes,
            storage_key: self.storage_key,
            storage_url: self.storage_url,
            thumbnail_key: self.thumbnail_key,
            thumbnail_url: self.thumbnail_url,
            uploaded_at,
            last_modified_at: None,
            uploader_label: self.uploader_label,
            tags: self.tags,
        }
    }
}

/// Partial metadata edit. `None` leaves a field unchanged; an empty description clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpdate {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl MediaUpdate {
    /// Trim and validate the edit, deduplicating tags.
    pub fn normalized(self) -> Result<MediaUpdate, ValidationError> {
        let title = match self.title {
            Some(title) => {
                let trimmed = title.trim().to_string();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyTitle);
                }
                Some(trimmed)
            }
            None => None,
        };
        let description = self.description.map(|d| d.trim().to_string());
        let tags = self.tags.map(validation::normalize_tags).transpose()?;

        let update = MediaUpdate {
            title,
            description,
            tags,
        };
        update.validate()?;
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// Human-readable size using base-1024 units, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_record() -> MediaRecord {
        NewMediaRecord {
            title: "Sunset".to_string(),
            description: Some("Over the bay".to_string()),
            file_name: "sunset.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            file_kind: FileKind::Image,
            file_size_bytes: 2048,
            storage_key: "media/a.jpg".to_string(),
            storage_url: "memory://media/a.jpg".to_string(),
            thumbnail_key: None,
            thumbnail_url: None,
            uploader_label: None,
            tags: vec!["beach".to_string()],
        }
        .into_record(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_apply_update_changes_only_editable_fields() {
        let mut record = sample_record();
        let before = record.clone();
        let update = MediaUpdate {
            title: Some("Dusk".to_string()),
            description: Some(String::new()),
            tags: Some(vec!["sky".to_string()]),
        };

        record.apply_update(&update, Utc::now());

        assert_eq!(record.title, "Dusk");
        assert_eq!(record.description, None);
        assert_eq!(record.tags, vec!["sky".to_string()]);
        assert_eq!(record.file_kind, before.file_kind);
        assert_eq!(record.file_size_bytes, before.file_size_bytes);
        assert_eq!(record.storage_url, before.storage_url);
        assert!(record.last_modified_at.is_some());
    }

    #[test]
    fn test_last_modified_never_before_upload() {
        let mut record = sample_record();
        let earlier = record.uploaded_at - Duration::hours(3);
        record.apply_update(&MediaUpdate::default(), earlier);
        assert_eq!(record.last_modified_at, Some(record.uploaded_at));
    }

    #[test]
    fn test_update_normalization() {
        let update = MediaUpdate {
            title: Some("  Trip  ".to_string()),
            description: None,
            tags: Some(vec![
                "a".to_string(),
                " a ".to_string(),
                "A".to_string(),
                "".to_string(),
            ]),
        }
        .normalized()
        .unwrap();

        assert_eq!(update.title.as_deref(), Some("Trip"));
        assert_eq!(update.tags, Some(vec!["a".to_string(), "A".to_string()]));
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let err = MediaUpdate {
            title: Some("   ".to_string()),
            ..Default::default()
        }
        .normalized()
        .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyTitle));
    }

    #[test]
    fn test_thumbnail_only_for_images() {
        let mut new = NewMediaRecord {
            title: "clip".to_string(),
            description: None,
            file_name: "clip.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            file_kind: FileKind::Video,
            file_size_bytes: 10,
            storage_key: "media/b.mp4".to_string(),
            storage_url: "memory://media/b.mp4".to_string(),
            thumbnail_key: None,
            thumbnail_url: Some("memory://thumbnails/b.jpg".to_string()),
            uploader_label: None,
            tags: vec![],
        };
        assert!(matches!(
            new.check_invariants(),
            Err(ValidationError::ThumbnailNotAllowed(FileKind::Video))
        ));

        new.thumbnail_url = None;
        assert!(new.check_invariants().is_ok());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.get("fileName").is_some());
        assert!(json.get("fileSizeBytes").is_some());
        assert_eq!(json["fileKind"], "image");
        assert!(json.get("thumbnailUrl").is_none());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
    }
}
