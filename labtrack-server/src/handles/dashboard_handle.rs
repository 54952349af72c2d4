use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router, middleware};
use labtrack_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::DashboardService;

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard_service: Arc<DashboardService>,
}

pub fn dashboard_router(dashboard_state: DashboardState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/dashboard/rooms", get(get_room_cards))
        .route("/api/dashboard/equipment", get(get_equipment_cards))
        .route("/api/dashboard/inspections", get(get_inspection_cards))
        .route("/api/dashboard/summary", get(get_summary))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(dashboard_state)
}

#[utoipa::path(
    get,
    path = "/api/dashboard/rooms",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rooms with their latest reading and status", body = Vec<RoomWithLatestReading>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_room_cards(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<RoomWithLatestReading>>, ApiError> {
    Ok(Json(state.dashboard_service.rooms().await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/equipment",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Temperature equipment with their latest reading and status", body = Vec<EquipmentWithLatestReading>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_equipment_cards(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<EquipmentWithLatestReading>>, ApiError> {
    Ok(Json(state.dashboard_service.equipment().await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/inspections",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Inspectable equipment with their latest inspection", body = Vec<EquipmentWithLatestInspection>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_inspection_cards(
    State(state): State<DashboardState>,
) -> Result<Json<Vec<EquipmentWithLatestInspection>>, ApiError> {
    Ok(Json(state.dashboard_service.inspections().await?))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Aggregate counts", body = DashboardSummary),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_summary(
    State(state): State<DashboardState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.dashboard_service.summary().await?))
}
