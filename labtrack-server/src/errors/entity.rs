use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Equipment not found")]
    EquipmentNotFound,

    #[error("Barcode {0} is already assigned")]
    BarcodeExists(String),
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::RoomNotFound => StatusCode::NOT_FOUND,
            EntityError::EquipmentNotFound => StatusCode::NOT_FOUND,
            EntityError::BarcodeExists(_) => StatusCode::CONFLICT,
        }
    }
}
