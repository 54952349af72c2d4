use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use labtrack_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::{EntityService, PermissionService, TokenClaims};

#[derive(Clone)]
pub struct RoomState {
    pub entity_service: Arc<EntityService>,
    pub permission_service: Arc<PermissionService>,
}

pub fn room_router(room_state: RoomState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/rooms", get(get_rooms).post(create_room))
        .route(
            "/api/rooms/:room_id",
            get(get_room_by_id).put(update_room).delete(delete_room),
        )
        .route("/api/rooms/by-code/:code", get(get_room_by_code))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(room_state)
}

#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "room",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rooms ordered by name", body = Vec<RoomResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_rooms(State(state): State<RoomState>) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    Ok(Json(state.entity_service.list_rooms().await?))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}",
    tag = "room",
    params(
        ("room_id" = i32, Path, description = "Room ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Room found", body = RoomResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room_by_id(
    State(state): State<RoomState>,
    Path(room_id): Path<i32>,
) -> Result<Json<RoomResponse>, ApiError> {
    Ok(Json(state.entity_service.get_room(room_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/rooms/by-code/{code}",
    tag = "room",
    params(
        ("code" = String, Path, description = "Printed barcode")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Room found", body = RoomResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No room carries this barcode")
    )
)]
pub async fn get_room_by_code(
    State(state): State<RoomState>,
    Path(code): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    Ok(Json(state.entity_service.room_by_code(&code).await?))
}

#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "room",
    request_body = CreateRoomRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Room created", body = RoomResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Barcode already in use"),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn create_room(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<RoomState>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<Json<RoomResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(state.entity_service.create_room(body).await?))
}

#[utoipa::path(
    put,
    path = "/api/rooms/{room_id}",
    tag = "room",
    params(
        ("room_id" = i32, Path, description = "Room ID")
    ),
    request_body = UpdateRoomRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Room updated", body = RoomResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Barcode already in use")
    )
)]
pub async fn update_room(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<RoomState>,
    Path(room_id): Path<i32>,
    Json(body): Json<UpdateRoomRequest>,
) -> Result<Json<RoomResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(state.entity_service.update_room(room_id, body).await?))
}

#[utoipa::path(
    delete,
    path = "/api/rooms/{room_id}",
    tag = "room",
    params(
        ("room_id" = i32, Path, description = "Room ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Room and its readings deleted", body = bool),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn delete_room(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<RoomState>,
    Path(room_id): Path<i32>,
) -> Result<Json<bool>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    state.entity_service.delete_room(room_id).await?;

    Ok(Json(true))
}
