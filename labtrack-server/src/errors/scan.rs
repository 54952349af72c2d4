use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("No room or equipment matches \"{0}\"")]
    CodeNotFound(String),

    #[error("Scanned code is empty")]
    EmptyPayload,
}

impl ScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::CodeNotFound(_) => StatusCode::NOT_FOUND,
            ScanError::EmptyPayload => StatusCode::BAD_REQUEST,
        }
    }
}
