use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    EmailExists,

    #[error("No account for this email")]
    UserNotFound,

    #[error("Wrong password")]
    InvalidPassword,

    #[error("Bearer token is not valid")]
    InvalidToken,

    #[error("Session expired, sign in again")]
    TokenExpired,

    #[error("Sign in required")]
    Unauthenticated,

    #[error("Administrator role required")]
    InsufficientPermission,

    #[error("Malformed request")]
    InvalidRequest,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailExists => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidPassword
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermission => StatusCode::FORBIDDEN,
            AuthError::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}
