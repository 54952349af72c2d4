use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::middlewares::TokenState;
use crate::repositories::UserRepository;
use crate::services::{
    AuthService, ChangeFeed, DashboardService, EntityService, PermissionService, ReadingService,
    ReportService, ResolverService, TokenService,
};

/// Wires every service onto one router sharing `storage`.
pub fn create_router(storage: Arc<Storage>, settings: &Settings) -> Router {
    let change_feed = Arc::new(ChangeFeed::new(settings.feed.capacity));

    let auth_service = Arc::new(AuthService::new());
    let token_service = Arc::new(TokenService::new(settings.auth.clone()));
    let permission_service = Arc::new(PermissionService::new(storage.clone()));
    let entity_service = Arc::new(EntityService::new(storage.clone(), change_feed.clone()));
    let reading_service = Arc::new(ReadingService::new(
        storage.clone(),
        permission_service.clone(),
        change_feed.clone(),
    ));
    let resolver_service = Arc::new(ResolverService::new(storage.clone()));
    let dashboard_service = Arc::new(DashboardService::new(storage.clone()));
    let report_service = Arc::new(ReportService::new(storage.clone(), &settings.report));
    let user_repository = Arc::new(UserRepository::new(storage.clone()));

    let token_state = TokenState {
        token_service: token_service.clone(),
    };

    Router::new()
        .merge(auth_router(
            AuthState {
                auth_service,
                token_service,
                user_repository: user_repository.clone(),
                auth: Arc::new(settings.auth.clone()),
            },
            token_state.clone(),
        ))
        .merge(user_router(
            UserState {
                user_repository,
                permission_service: permission_service.clone(),
            },
            token_state.clone(),
        ))
        .merge(room_router(
            RoomState {
                entity_service: entity_service.clone(),
                permission_service: permission_service.clone(),
            },
            token_state.clone(),
        ))
        .merge(equipment_router(
            EquipmentState {
                entity_service,
                permission_service: permission_service.clone(),
            },
            token_state.clone(),
        ))
        .merge(reading_router(
            ReadingState {
                reading_service,
                permission_service,
            },
            token_state.clone(),
        ))
        .merge(scan_router(ScanState { resolver_service }, token_state.clone()))
        .merge(dashboard_router(
            DashboardState { dashboard_service },
            token_state.clone(),
        ))
        .merge(report_router(ReportState { report_service }, token_state.clone()))
        .merge(event_router(EventState { change_feed }, token_state))
        .merge(docs_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn create_app(settings: &Settings) -> anyhow::Result<Router> {
    let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);

    Ok(create_router(storage, settings))
}
