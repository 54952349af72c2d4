use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use labtrack_api::models::*;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::{EntityService, PermissionService, TokenClaims};

#[derive(Clone)]
pub struct EquipmentState {
    pub entity_service: Arc<EntityService>,
    pub permission_service: Arc<PermissionService>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EquipmentQuery {
    /// Only equipment that accepts this kind of record.
    pub kind: Option<EquipmentKind>,
}

pub fn equipment_router(equipment_state: EquipmentState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/equipment", get(get_equipment).post(create_equipment))
        .route(
            "/api/equipment/:equipment_id",
            get(get_equipment_by_id)
                .put(update_equipment)
                .delete(delete_equipment),
        )
        .route("/api/equipment/by-code/:code", get(get_equipment_by_code))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(equipment_state)
}

#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "equipment",
    params(EquipmentQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment ordered by name", body = Vec<EquipmentResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_equipment(
    State(state): State<EquipmentState>,
    Query(query): Query<EquipmentQuery>,
) -> Result<Json<Vec<EquipmentResponse>>, ApiError> {
    Ok(Json(state.entity_service.list_equipment(query.kind).await?))
}

#[utoipa::path(
    get,
    path = "/api/equipment/{equipment_id}",
    tag = "equipment",
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment found", body = EquipmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment_by_id(
    State(state): State<EquipmentState>,
    Path(equipment_id): Path<i32>,
) -> Result<Json<EquipmentResponse>, ApiError> {
    Ok(Json(state.entity_service.get_equipment(equipment_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/equipment/by-code/{code}",
    tag = "equipment",
    params(
        ("code" = String, Path, description = "Printed barcode")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment found", body = EquipmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No equipment carries this barcode")
    )
)]
pub async fn get_equipment_by_code(
    State(state): State<EquipmentState>,
    Path(code): Path<String>,
) -> Result<Json<EquipmentResponse>, ApiError> {
    Ok(Json(state.entity_service.equipment_by_code(&code).await?))
}

#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "equipment",
    request_body = CreateEquipmentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment created", body = EquipmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Barcode already in use"),
        (status = 422, description = "Invalid fields")
    )
)]
pub async fn create_equipment(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<EquipmentState>,
    Json(body): Json<CreateEquipmentRequest>,
) -> Result<Json<EquipmentResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(state.entity_service.create_equipment(body).await?))
}

#[utoipa::path(
    put,
    path = "/api/equipment/{equipment_id}",
    tag = "equipment",
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    request_body = UpdateEquipmentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment updated", body = EquipmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Barcode already in use")
    )
)]
pub async fn update_equipment(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<EquipmentState>,
    Path(equipment_id): Path<i32>,
    Json(body): Json<UpdateEquipmentRequest>,
) -> Result<Json<EquipmentResponse>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    Ok(Json(
        state
            .entity_service
            .update_equipment(equipment_id, body)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/equipment/{equipment_id}",
    tag = "equipment",
    params(
        ("equipment_id" = i32, Path, description = "Equipment ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Equipment, readings and inspections deleted", body = bool),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    Extension(token_data): Extension<TokenClaims>,
    State(state): State<EquipmentState>,
    Path(equipment_id): Path<i32>,
) -> Result<Json<bool>, ApiError> {
    state.permission_service.require_admin(token_data.sub).await?;

    state.entity_service.delete_equipment(equipment_id).await?;

    Ok(Json(true))
}
