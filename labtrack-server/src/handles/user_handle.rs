use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router, middleware};
use labtrack_api::models::*;

use crate::errors::{ApiError, AuthError};
use crate::middlewares::{TokenState, auth};
use crate::repositories::UserRepository;
use crate::services::{PermissionService, TokenClaims};

#[derive(Clone)]
pub struct UserState {
    pub user_repository: Arc<UserRepository>,
    pub permission_service: Arc<PermissionService>,
}

pub fn user_router(user_state: UserState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/users", get(get_users))
        .route("/api/users/:user_id/role", put(update_user_role))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(user_state)
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All accounts", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_users(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<UserState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    let users = state.user_repository.find_all().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}/role",
    tag = "user",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<UserState>,
    Path(user_id): Path<i32>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    let mut tx = state.user_repository.get_pool().begin().await?;
    let affected = state
        .user_repository
        .update_role(user_id, &body.role.to_string(), &mut tx)
        .await?;
    if affected != 1 {
        return Err(AuthError::UserNotFound.into());
    }
    tx.commit().await?;

    tracing::info!("user {} set role of {user_id} to {}", token_data.sub, body.role);

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}
