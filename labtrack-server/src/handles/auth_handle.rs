use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use labtrack_api::FieldError;
use labtrack_api::models::*;
use time::OffsetDateTime;

use crate::configs::Auth;
use crate::errors::{ApiError, AuthError};
use crate::middlewares::{TokenState, auth};
use crate::models::{User, stored_time};
use crate::repositories::UserRepository;
use crate::services::{AuthService, TokenClaims, TokenService};

const PASSWORD_MIN_LENGTH: usize = 6;

#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
    pub user_repository: Arc<UserRepository>,
    pub auth: Arc<Auth>,
}

pub fn auth_router(auth_state: AuthState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route(
            "/api/auth/refresh",
            post(refresh_token)
                .route_layer(middleware::from_fn_with_state(token_state.clone(), auth)),
        )
        .route(
            "/api/auth/me",
            get(get_current_user)
                .route_layer(middleware::from_fn_with_state(token_state.clone(), auth)),
        )
        .with_state(auth_state)
}

fn validate_registration(body: &RegisterRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        errors.push(FieldError::new("email", "must be an email address"));
    }
    if body.password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("must be at least {PASSWORD_MIN_LENGTH} characters"),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn issue_token(state: &AuthState, user: User) -> Result<String, ApiError> {
    let token = state
        .token_service
        .generate_token(user)
        .map_err(|e| anyhow!("Failed to sign token: {}", e))?;

    Ok(token.token)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created; body is a bearer token", body = String),
        (status = 409, description = "Email already exists"),
        (status = 422, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    Json(body): Json<RegisterRequest>,
) -> Result<String, ApiError> {
    validate_registration(&body)?;

    let email = body.email.trim().to_string();
    if state.user_repository.find_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailExists.into());
    }

    let password = state
        .auth_service
        .hash(&body.password)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;

    let role = if state.auth.is_admin_email(&email) {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let user = User {
        id: 0,
        email,
        password,
        full_name: body
            .full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        role: role.to_string(),
        created_at: stored_time(OffsetDateTime::now_utc()),
    };

    let mut tx = state.user_repository.get_pool().begin().await?;

    let id = state.user_repository.create(&user, &mut tx).await?;

    tx.commit().await?;

    let created_user = state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    tracing::info!("registered user {} as {}", created_user.id, created_user.role);

    issue_token(&state, created_user)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token for the operator", body = String),
        (status = 404, description = "No account for this email"),
        (status = 401, description = "Wrong password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    Json(body): Json<LoginRequest>,
) -> Result<String, ApiError> {
    let user = state
        .user_repository
        .find_by_email(body.email.trim())
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let verified = state
        .auth_service
        .verify(&user, &body.password)
        .map_err(|e| anyhow!("Failed to verify password: {}", e))?;

    if !verified {
        tracing::debug!("rejected password for user {}", user.id);
        return Err(AuthError::InvalidPassword.into());
    }

    issue_token(&state, user)
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Fresh bearer token with the current role", body = String),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn refresh_token(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<AuthState>,
) -> Result<String, ApiError> {
    let user = state
        .user_repository
        .find_by_id(token_data.sub)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    issue_token(&state, user)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile of the signed-in operator", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account was removed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_current_user(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<AuthState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_repository
        .find_by_id(token_data.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_requires_email_and_password() {
        let errors = validate_registration(&RegisterRequest {
            email: String::from("not-an-email"),
            password: String::from("123"),
            full_name: None,
        })
        .unwrap_err();

        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }
}
