pub mod api;
pub mod auth;
pub mod entity;
pub mod reading;
pub mod report;
pub mod scan;

pub use api::ApiError;
pub use auth::AuthError;
pub use entity::EntityError;
pub use reading::ReadingError;
pub use report::ReportError;
pub use scan::ScanError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

fn kind_of(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::UNPROCESSABLE_ENTITY => "validation",
        _ => "internal",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, log_message) = match &self {
            ApiError::AuthError(e) => (e.status_code(), e.to_string(), None),
            ApiError::EntityError(e) => (e.status_code(), e.to_string(), None),
            ApiError::ReadingError(e) => (e.status_code(), e.to_string(), None),
            ApiError::ScanError(e) => (e.status_code(), e.to_string(), None),
            ApiError::ReportError(e) => (e.status_code(), e.to_string(), None),
            ApiError::ValidationError(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                self.to_string(),
                None,
            ),
            ApiError::IntegrityError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Integrity error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored data is inconsistent".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::DatabaseError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
        };

        let kind = match &self {
            ApiError::IntegrityError(_) => "integrity",
            _ => kind_of(status),
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "kind": kind,
            "message": error_message
        });

        if let Some(error_id) = log_message {
            error_obj["error_id"] = json!(error_id);
        }

        if let ApiError::ValidationError(fields) = &self {
            error_obj["fields"] = json!(fields);
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
