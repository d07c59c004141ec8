//! Error types module
//!
//! Every fallible library operation returns `AppError`. Storage and repository crates keep
//! their own error enums and convert into `AppError` at the crate boundary, so callers can
//! tell a missing record (`NotFound`) apart from a failing backend (`Repository`,
//! `Storage`) and render "already deleted" instead of a generic failure.

use uuid::Uuid;

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation in consuming UI and API layers
pub trait ErrorMetadata {
    /// HTTP status code an API layer should return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether a fresh call with the same arguments may succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Partial delete of record {id}: {message}")]
    PartialDelete { id: Uuid, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.into())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "VALIDATION_ERROR", false, LogLevel::Debug),
        AppError::Storage(_) => (502, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Repository(_) => (500, "REPOSITORY_ERROR", true, LogLevel::Error),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::PartialDelete { .. } => (500, "PARTIAL_DELETE", true, LogLevel::Error),
        AppError::Config(_) => (500, "CONFIG_ERROR", false, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::Storage(_) => "Storage",
            AppError::Repository(_) => "Repository",
            AppError::NotFound(_) => "NotFound",
            AppError::PartialDelete { .. } => "PartialDelete",
            AppError::Config(_) => "Config",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.to_string(),
            AppError::Storage(_) => "Failed to access file storage".to_string(),
            AppError::Repository(_) => "Failed to access the media catalog".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::PartialDelete { .. } => {
                "The file was removed but its catalog entry could not be deleted".to_string()
            }
            AppError::Config(_) | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_validation() {
        let err = AppError::from(ValidationError::EmptyFile);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Empty file");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Media not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.is_not_found());
        assert_eq!(err.client_message(), "Media not found");
    }

    #[test]
    fn test_backend_errors_hide_details() {
        let err = AppError::Storage("bucket quota exceeded for tenant xyz".to_string());
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_recoverable());
        assert!(!err.client_message().contains("xyz"));

        let err = AppError::PartialDelete {
            id: Uuid::nil(),
            message: "connection reset".to_string(),
        };
        assert_eq!(err.error_code(), "PARTIAL_DELETE");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_detailed_message_includes_source() {
        let err = AppError::from(anyhow::anyhow!("disk unplugged").context("write failed"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by"));
    }
}
