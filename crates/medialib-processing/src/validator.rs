use medialib_core::validation::{normalize_tags, resolve_title, validate_description};
use medialib_core::{classify, FileKind, ValidationError};

use crate::upload::types::{UploadFile, UploadMetadata};

/// Upload input after validation, ready for the storage phase
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub mime_type: String,
    pub file_kind: FileKind,
    pub size_bytes: u64,
}

/// Upload validator
///
/// Checks the file and resolves its metadata without touching storage.
#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    max_file_size: u64,
}

impl UploadValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the original file name
    ///
    /// The name is kept for display only, but path separators and NUL are refused.
    pub fn validate_file_name(&self, file_name: &str) -> Result<(), ValidationError> {
        if file_name.trim().is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains('\0')
        {
            return Err(ValidationError::InvalidFilename(file_name.to_string()));
        }
        Ok(())
    }

    /// Run every check and resolve title, description and tags
    pub fn validate(
        &self,
        file: &UploadFile,
        metadata: &UploadMetadata,
    ) -> Result<ValidatedUpload, ValidationError> {
        self.validate_file_size(file.size())?;
        self.validate_file_name(&file.file_name)?;

        let title = resolve_title(metadata.title.as_deref(), &file.file_name)?;
        let description = validate_description(metadata.description.as_deref())?;
        let tags = normalize_tags(metadata.tags.clone())?;

        let mime_type = file.normalized_mime_type();
        let file_kind = classify(&mime_type);

        Ok(ValidatedUpload {
            title,
            description,
            tags,
            mime_type,
            file_kind,
            size_bytes: file.size(),
        })
    }
}
