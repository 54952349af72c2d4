use axum::http::StatusCode;
use labtrack_api::models::EquipmentKind;

#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    #[error("Reading not found")]
    ReadingNotFound,

    #[error("Inspection not found")]
    InspectionNotFound,

    #[error("{equipment} does not take {kind} records")]
    KindMismatch {
        equipment: String,
        kind: EquipmentKind,
    },
}

impl ReadingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReadingError::ReadingNotFound => StatusCode::NOT_FOUND,
            ReadingError::InspectionNotFound => StatusCode::NOT_FOUND,
            ReadingError::KindMismatch { .. } => StatusCode::CONFLICT,
        }
    }
}
