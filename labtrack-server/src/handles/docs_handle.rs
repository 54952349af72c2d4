use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        refresh_token,
        get_current_user,
        get_users,
        update_user_role,
        get_rooms,
        get_room_by_id,
        get_room_by_code,
        create_room,
        update_room,
        delete_room,
        get_equipment,
        get_equipment_by_id,
        get_equipment_by_code,
        create_equipment,
        update_equipment,
        delete_equipment,
        create_room_reading,
        create_equipment_reading,
        create_inspection,
        get_room_readings,
        get_equipment_readings,
        get_inspections,
        update_room_reading,
        delete_room_reading,
        update_equipment_reading,
        delete_equipment_reading,
        update_inspection,
        delete_inspection,
        resolve_scan,
        get_room_cards,
        get_equipment_cards,
        get_inspection_cards,
        get_summary,
        export_report,
        subscribe_events,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and sessions"),
        (name = "room", description = "Lab rooms"),
        (name = "equipment", description = "Lab equipment"),
        (name = "reading", description = "Temperature readings and inspections"),
        (name = "scan", description = "Barcode and deep link resolution"),
        (name = "dashboard", description = "Status overview"),
        (name = "report", description = "CSV export"),
        (name = "event", description = "Change notifications")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub fn docs_router() -> Router {
    Router::new().route(
        "/api/docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
