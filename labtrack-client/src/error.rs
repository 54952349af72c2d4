use labtrack_api::FieldError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Why the camera could not be used. Each cause has a different remedy for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Camera permission denied, allow camera access and retry")]
    PermissionDenied,

    #[error("No camera found on this device")]
    NotFound,

    #[error("Camera is in use by another application")]
    Busy,

    #[error("Camera streaming is not supported here")]
    Unsupported,

    #[error("Camera failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("No room or equipment matches \"{payload}\"")]
    NotFound { payload: String },

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("Sign in required")]
    Unauthenticated,

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Temporary failure: {0}")]
    Transient(String),

    #[error("Integrity problem: {0}")]
    Integrity(String),

    #[error("Another operation is still running")]
    Busy,

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("Invalid server address: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// True when repeating the same action may succeed without operator changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Transient(_) | ClientError::Busy | ClientError::Camera(CameraError::Busy)
        )
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ClientError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<Vec<FieldError>> for ClientError {
    fn from(fields: Vec<FieldError>) -> Self {
        ClientError::Validation(fields)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => from_status(status, ErrorBody::default()),
            None => ClientError::Transient(err.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    fields: Vec<FieldError>,
}

impl ErrorBody {
    pub(crate) fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice::<ErrorEnvelope>(bytes)
            .map(|envelope| envelope.error)
            .unwrap_or_default()
    }
}

/// Maps a failed response onto the client taxonomy.
pub(crate) fn from_status(status: StatusCode, body: ErrorBody) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthenticated,
        StatusCode::FORBIDDEN => ClientError::Forbidden(body.message),
        StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(body.fields),
        _ if body.kind == "integrity" => ClientError::Integrity(body.message),
        status if status.is_server_error() => ClientError::Transient(body.message),
        status => ClientError::Rejected {
            status: status.as_u16(),
            message: body.message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_mapping() {
        let body = br#"{"error":{"code":500,"kind":"integrity","message":"row survived delete"}}"#;
        let error = from_status(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::parse(body));
        assert!(matches!(error, ClientError::Integrity(ref m) if m == "row survived delete"));
        assert!(!error.is_retryable());

        let error = from_status(StatusCode::BAD_GATEWAY, ErrorBody::parse(b"<html>"));
        assert!(error.is_retryable());

        let body = br#"{"error":{"code":422,"kind":"validation","message":"x","fields":[{"field":"humidity","message":"too high"}]}}"#;
        match from_status(StatusCode::UNPROCESSABLE_ENTITY, ErrorBody::parse(body)) {
            ClientError::Validation(fields) => assert_eq!(fields[0].field, "humidity"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            from_status(StatusCode::UNAUTHORIZED, ErrorBody::default()),
            ClientError::Unauthenticated
        ));
    }

    #[test]
    fn test_not_found_names_payload() {
        let error = ClientError::NotFound {
            payload: String::from("XYZ-999"),
        };
        assert!(error.to_string().contains("XYZ-999"));
    }
}
