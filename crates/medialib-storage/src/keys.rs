//! Shared key generation for storage backends.
//!
//! Key format: `media/{object_id}.{ext}` for originals and `thumbnails/{object_id}.{ext}`
//! for thumbnails, where `object_id` is a fresh UUID chosen per upload. The user-supplied
//! file name never becomes part of the key.

use crate::traits::{StorageError, StorageResult};
use uuid::Uuid;

const MAX_EXTENSION_LENGTH: usize = 10;

/// Lowercased extension of `file_name`, if it is short and alphanumeric.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LENGTH {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Generate the storage key for an original file.
pub fn media_key(id: Uuid, file_name: &str) -> String {
    match extension_of(file_name) {
        Some(ext) => format!("media/{}.{}", id, ext),
        None => format!("media/{}", id),
    }
}

/// Generate the storage key for a thumbnail.
pub fn thumbnail_key(id: Uuid, extension: &str) -> String {
    format!("thumbnails/{}.{}", id, extension.trim_start_matches('.'))
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_key_ignores_file_stem() {
        let id = Uuid::new_v4();
        assert_eq!(media_key(id, "Holiday Photo.JPG"), format!("media/{}.jpg", id));
        assert_eq!(media_key(id, "README"), format!("media/{}", id));
        assert_eq!(media_key(id, ".bashrc"), format!("media/{}", id));
        assert_eq!(media_key(id, "x.tar/../../etc"), format!("media/{}", id));
    }

    #[test]
    fn test_thumbnail_key() {
        let id = Uuid::new_v4();
        assert_eq!(thumbnail_key(id, ".jpg"), format!("thumbnails/{}.jpg", id));
        assert_eq!(thumbnail_key(id, "png"), format!("thumbnails/{}.png", id));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("media/a.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("media\\a.jpg").is_err());
    }
}
