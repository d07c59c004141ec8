use medialib_core::{AppError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

/// Catalog repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Media record not found: {0}")]
    NotFound(Uuid),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Repository backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => {
                AppError::NotFound(format!("Media record not found: {}", id))
            }
            RepositoryError::Validation(e) => AppError::Validation(e),
            other => AppError::Repository(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
