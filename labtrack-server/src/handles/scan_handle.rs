use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router, middleware};
use labtrack_api::models::*;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::ResolverService;

#[derive(Clone)]
pub struct ScanState {
    pub resolver_service: Arc<ResolverService>,
}

pub fn scan_router(scan_state: ScanState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/scan/resolve", post(resolve_scan))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(scan_state)
}

/// Resolves a scanned barcode or deep link into the room or equipment it names.
#[utoipa::path(
    post,
    path = "/api/scan/resolve",
    tag = "scan",
    request_body = ResolveRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Payload resolved", body = ResolvedEntity),
        (status = 400, description = "Empty payload"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Nothing matches the payload")
    )
)]
pub async fn resolve_scan(
    State(state): State<ScanState>,
    Json(body): Json<ResolveRequest>,
) -> Result<Json<ResolvedEntity>, ApiError> {
    Ok(Json(state.resolver_service.resolve(&body.payload).await?))
}
