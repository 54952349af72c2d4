use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Router, middleware};
use labtrack_api::models::*;
use time::OffsetDateTime;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::ReportService;

#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
}

pub fn report_router(report_state: ReportState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/reports/export", get(export_report))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(report_state)
}

#[utoipa::path(
    get,
    path = "/api/reports/export",
    tag = "report",
    params(ReportQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 400, description = "Inverted range or no category selected"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No records in range")
    )
)]
pub async fn export_report(
    State(state): State<ReportState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .report_service
        .export_csv(&query, OffsetDateTime::now_utc())
        .await?;

    tracing::info!("exported {} rows as {}", report.rows, report.filename);

    let disposition = format!("attachment; filename=\"{}\"", report.filename);

    Ok((
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.content,
    ))
}
