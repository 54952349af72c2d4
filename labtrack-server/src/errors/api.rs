use labtrack_api::FieldError;

use super::{AuthError, EntityError, ReadingError, ReportError, ScanError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Entity error: {0}")]
    EntityError(#[from] EntityError),

    #[error("Reading error: {0}")]
    ReadingError(#[from] ReadingError),

    #[error("Scan error: {0}")]
    ScanError(#[from] ScanError),

    #[error("Report error: {0}")]
    ReportError(#[from] ReportError),

    #[error("Validation failed")]
    ValidationError(Vec<FieldError>),

    #[error("Data integrity error: {0}")]
    IntegrityError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::ValidationError(errors)
    }
}
