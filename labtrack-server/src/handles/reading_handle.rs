use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router, middleware};
use labtrack_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::{PermissionService, ReadingService, TokenClaims};

#[derive(Clone)]
pub struct ReadingState {
    pub reading_service: Arc<ReadingService>,
    pub permission_service: Arc<PermissionService>,
}

pub fn reading_router(reading_state: ReadingState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/rooms/:room_id/readings", post(create_room_reading))
        .route(
            "/api/equipment/:equipment_id/readings",
            post(create_equipment_reading),
        )
        .route(
            "/api/equipment/:equipment_id/inspections",
            post(create_inspection),
        )
        .route("/api/readings/rooms", get(get_room_readings))
        .route("/api/readings/equipment", get(get_equipment_readings))
        .route("/api/readings/inspections", get(get_inspections))
        .route(
            "/api/readings/rooms/:reading_id",
            put(update_room_reading).delete(delete_room_reading),
        )
        .route(
            "/api/readings/equipment/:reading_id",
            put(update_equipment_reading).delete(delete_equipment_reading),
        )
        .route(
            "/api/readings/inspections/:inspection_id",
            put(update_inspection).delete(delete_inspection),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(reading_state)
}

#[utoipa::path(
    post,
    path = "/api/rooms/{room_id}/readings",
    tag = "reading",
    params(
        ("room_id" = i32, Path, description = "Room ID")
    ),
    request_body = CreateTemperatureReadingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reading stored", body = TemperatureLogResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found"),
        (status = 422, description = "Temperature or humidity out of range")
    )
)]
pub async fn create_room_reading(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(room_id): Path<i32>,
    Json(body): Json<CreateTemperatureReadingRequest>,
) -> Result<Json<TemperatureLogResponse>, ApiError> {
    let reading = state
        .reading_service
        .submit_room_reading(token_data.sub, room_id, body)
        .await?;

    Ok(Json(reading))
}

#[utoipa::path(
    post,
    path = "/api/equipment/{equipment_id}/readings",
    tag = "reading",
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    request_body = CreateTemperatureReadingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reading stored", body = EquipmentTemperatureLogResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment only accepts inspections"),
        (status = 422, description = "Temperature out of range or humidity given")
    )
)]
pub async fn create_equipment_reading(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(equipment_id): Path<i32>,
    Json(body): Json<CreateTemperatureReadingRequest>,
) -> Result<Json<EquipmentTemperatureLogResponse>, ApiError> {
    let reading = state
        .reading_service
        .submit_equipment_reading(token_data.sub, equipment_id, body)
        .await?;

    Ok(Json(reading))
}

#[utoipa::path(
    post,
    path = "/api/equipment/{equipment_id}/inspections",
    tag = "reading",
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    request_body = CreateInspectionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Inspection stored", body = InspectionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment only accepts temperature readings")
    )
)]
pub async fn create_inspection(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(equipment_id): Path<i32>,
    Json(body): Json<CreateInspectionRequest>,
) -> Result<Json<InspectionResponse>, ApiError> {
    let inspection = state
        .reading_service
        .submit_inspection(token_data.sub, equipment_id, body)
        .await?;

    Ok(Json(inspection))
}

#[utoipa::path(
    get,
    path = "/api/readings/rooms",
    tag = "reading",
    params(ReadingFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Room readings in chronological order", body = Vec<TemperatureLogResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_room_readings(
    State(state): State<ReadingState>,
    Query(filter): Query<ReadingFilter>,
) -> Result<Json<Vec<TemperatureLogResponse>>, ApiError> {
    Ok(Json(state.reading_service.list_room_readings(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/readings/equipment",
    tag = "reading",
    params(ReadingFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment readings in chronological order", body = Vec<EquipmentTemperatureLogResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_equipment_readings(
    State(state): State<ReadingState>,
    Query(filter): Query<ReadingFilter>,
) -> Result<Json<Vec<EquipmentTemperatureLogResponse>>, ApiError> {
    Ok(Json(
        state.reading_service.list_equipment_readings(&filter).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/readings/inspections",
    tag = "reading",
    params(ReadingFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Inspections, newest first", body = Vec<InspectionResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_inspections(
    State(state): State<ReadingState>,
    Query(filter): Query<ReadingFilter>,
) -> Result<Json<Vec<InspectionResponse>>, ApiError> {
    Ok(Json(state.reading_service.list_inspections(&filter).await?))
}

#[utoipa::path(
    put,
    path = "/api/readings/rooms/{reading_id}",
    tag = "reading",
    params(
        ("reading_id" = i32, Path, description = "Reading ID")
    ),
    request_body = UpdateTemperatureReadingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reading corrected", body = TemperatureLogResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Reading not found")
    )
)]
pub async fn update_room_reading(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(reading_id): Path<i32>,
    Json(body): Json<UpdateTemperatureReadingRequest>,
) -> Result<Json<TemperatureLogResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(
        state
            .reading_service
            .update_room_reading(reading_id, body)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/readings/rooms/{reading_id}",
    tag = "reading",
    params(
        ("reading_id" = i32, Path, description = "Reading ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reading deleted", body = bool),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Reading not found")
    )
)]
pub async fn delete_room_reading(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(reading_id): Path<i32>,
) -> Result<Json<bool>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    state.reading_service.delete_room_reading(reading_id).await?;

    Ok(Json(true))
}

#[utoipa::path(
    put,
    path = "/api/readings/equipment/{reading_id}",
    tag = "reading",
    params(
        ("reading_id" = i32, Path, description = "Reading ID")
    ),
    request_body = UpdateTemperatureReadingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reading corrected", body = EquipmentTemperatureLogResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Reading not found")
    )
)]
pub async fn update_equipment_reading(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(reading_id): Path<i32>,
    Json(body): Json<UpdateTemperatureReadingRequest>,
) -> Result<Json<EquipmentTemperatureLogResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(
        state
            .reading_service
            .update_equipment_reading(reading_id, body)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/readings/equipment/{reading_id}",
    tag = "reading",
    params(
        ("reading_id" = i32, Path, description = "Reading ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reading deleted", body = bool),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Reading not found")
    )
)]
pub async fn delete_equipment_reading(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(reading_id): Path<i32>,
) -> Result<Json<bool>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    state
        .reading_service
        .delete_equipment_reading(reading_id)
        .await?;

    Ok(Json(true))
}

#[utoipa::path(
    put,
    path = "/api/readings/inspections/{inspection_id}",
    tag = "reading",
    params(
        ("inspection_id" = i32, Path, description = "Inspection ID")
    ),
    request_body = UpdateInspectionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Inspection corrected", body = InspectionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Inspection not found")
    )
)]
pub async fn update_inspection(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(inspection_id): Path<i32>,
    Json(body): Json<UpdateInspectionRequest>,
) -> Result<Json<InspectionResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(
        state
            .reading_service
            .update_inspection(inspection_id, body)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/readings/inspections/{inspection_id}",
    tag = "reading",
    params(
        ("inspection_id" = i32, Path, description = "Inspection ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Inspection deleted", body = bool),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Inspection not found")
    )
)]
pub async fn delete_inspection(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<ReadingState>,
    Path(inspection_id): Path<i32>,
) -> Result<Json<bool>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    state.reading_service.delete_inspection(inspection_id).await?;

    Ok(Json(true))
}
