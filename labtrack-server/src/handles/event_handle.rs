use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::get;
use axum::{Router, middleware};
use labtrack_api::FieldError;
use labtrack_api::models::*;
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt};
use utoipa::IntoParams;

use crate::errors::ApiError;
use crate::middlewares::{TokenState, auth};
use crate::services::ChangeFeed;

const ALL_TABLES: [ChangeTable; 5] = [
    ChangeTable::Rooms,
    ChangeTable::Equipment,
    ChangeTable::TemperatureLogs,
    ChangeTable::EquipmentTemperatureLogs,
    ChangeTable::EquipmentInspections,
];

#[derive(Clone)]
pub struct EventState {
    pub change_feed: Arc<ChangeFeed>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Comma separated table names. Every table when absent.
    pub tables: Option<String>,
}

pub fn event_router(event_state: EventState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/events", get(subscribe_events))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(event_state)
}

fn parse_tables(tables: Option<&str>) -> Result<Vec<ChangeTable>, FieldError> {
    let Some(tables) = tables.filter(|tables| !tables.trim().is_empty()) else {
        return Ok(ALL_TABLES.to_vec());
    };

    let mut parsed = Vec::new();
    for name in tables.split(',').filter(|name| !name.trim().is_empty()) {
        let table = ChangeTable::parse(name)
            .ok_or_else(|| FieldError::new("tables", format!("unknown table {}", name.trim())))?;
        if !parsed.contains(&table) {
            parsed.push(table);
        }
    }

    Ok(parsed)
}

/// Streams change notifications; the client refetches whatever it displays.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "event",
    params(EventQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Server-sent change events named after their table", content_type = "text/event-stream", body = ChangeEvent),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unknown table")
    )
)]
pub async fn subscribe_events(
    State(state): State<EventState>,
    Query(query): Query<EventQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let tables = parse_tables(query.tables.as_deref()).map_err(|e| vec![e])?;

    let stream = state
        .change_feed
        .subscribe(&tables)
        .filter_map(|event| {
            Event::default()
                .event(event.table.as_str())
                .json_data(event)
                .ok()
                .map(Ok)
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tables() {
        assert_eq!(parse_tables(None).unwrap(), ALL_TABLES.to_vec());
        assert_eq!(parse_tables(Some(" ")).unwrap(), ALL_TABLES.to_vec());
        assert_eq!(
            parse_tables(Some("rooms, temperature_logs,rooms")).unwrap(),
            vec![ChangeTable::Rooms, ChangeTable::TemperatureLogs]
        );
        assert_eq!(parse_tables(Some("windows")).unwrap_err().field, "tables");
    }
}
