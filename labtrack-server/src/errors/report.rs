use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report start must not be after its end")]
    InvalidRange,

    #[error("Select at least one category to export")]
    NoCategory,

    #[error("No data in the selected period")]
    NoData,
}

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportError::InvalidRange => StatusCode::BAD_REQUEST,
            ReportError::NoCategory => StatusCode::BAD_REQUEST,
            ReportError::NoData => StatusCode::NOT_FOUND,
        }
    }
}
