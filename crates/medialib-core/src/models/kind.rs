use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Substrings that mark a `text/*` or `application/*` type as a document.
const DOCUMENT_MARKERS: &[&str] = &["pdf", "word", "excel", "powerpoint", "document"];

/// Media kind derived from the MIME type at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Video => "video",
            FileKind::Audio => "audio",
            FileKind::Document => "document",
            FileKind::Other => "other",
        }
    }

    /// Same as [`classify`].
    pub fn from_mime(mime_type: &str) -> Self {
        classify(mime_type)
    }
}

/// Classify a MIME type into a [`FileKind`].
///
/// Total and deterministic: every input maps to exactly one kind. The top-level token
/// decides `image`, `video` and `audio`; `text/*` and `application/*` are documents only
/// when the full type names a known office/PDF format.
pub fn classify(mime_type: &str) -> FileKind {
    let normalized = mime_type.trim().to_lowercase();
    let top_level = normalized.split('/').next().unwrap_or("");

    match top_level {
        "image" => FileKind::Image,
        "video" => FileKind::Video,
        "audio" => FileKind::Audio,
        "text" | "application" => {
            if DOCUMENT_MARKERS.iter().any(|m| normalized.contains(m)) {
                FileKind::Document
            } else {
                FileKind::Other
            }
        }
        _ => FileKind::Other,
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(FileKind::Image),
            "video" => Ok(FileKind::Video),
            "audio" => Ok(FileKind::Audio),
            "document" => Ok(FileKind::Document),
            "other" => Ok(FileKind::Other),
            _ => Err(anyhow::anyhow!("Invalid file kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_top_level_kinds() {
        assert_eq!(classify("image/png"), FileKind::Image);
        assert_eq!(classify("video/mp4"), FileKind::Video);
        assert_eq!(classify("audio/mpeg"), FileKind::Audio);
    }

    #[test]
    fn test_classify_documents() {
        assert_eq!(classify("application/pdf"), FileKind::Document);
        assert_eq!(classify("application/msword"), FileKind::Document);
        assert_eq!(
            classify("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            FileKind::Document
        );
        assert_eq!(classify("application/vnd.ms-excel"), FileKind::Document);
        assert_eq!(classify("application/vnd.ms-powerpoint"), FileKind::Document);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify("application/zip"), FileKind::Other);
        assert_eq!(classify("text/plain"), FileKind::Other);
        assert_eq!(classify("font/woff2"), FileKind::Other);
        assert_eq!(classify(""), FileKind::Other);
        assert_eq!(classify("garbage"), FileKind::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("IMAGE/JPEG"), FileKind::Image);
        assert_eq!(classify(" Application/PDF "), FileKind::Document);
    }

    #[test]
    fn test_round_trip_str() {
        for kind in [
            FileKind::Image,
            FileKind::Video,
            FileKind::Audio,
            FileKind::Document,
            FileKind::Other,
        ] {
            assert_eq!(kind.as_str().parse::<FileKind>().unwrap(), kind);
        }
        assert!("spreadsheet".parse::<FileKind>().is_err());
    }
}
