#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use labtrack_server::configs::{Auth, Report, Storage};
use labtrack_server::handles::*;
use labtrack_server::middlewares::TokenState;
use labtrack_server::models::User;
use labtrack_server::repositories::UserRepository;
use labtrack_server::services::*;
use labtrack_server::tests::{create_test_user, setup_test_db};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "head@lab.test";

pub struct MockApp {
    pub router: Router,
    pub storage: Arc<Storage>,
    pub auth: Auth,
    pub change_feed: Arc<ChangeFeed>,
    pub token_service: Arc<TokenService>,
    pub permission_service: Arc<PermissionService>,
    pub entity_service: Arc<EntityService>,
    pub admin: User,
    pub user: User,
    pub admin_token: String,
    pub token: String,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = setup_test_db().await;
        let auth = Auth {
            secret: String::from("test"),
            expiration: 1000,
            admin_emails: vec![String::from(ADMIN_EMAIL)],
        };

        let change_feed = Arc::new(ChangeFeed::new(16));
        let token_service = Arc::new(TokenService::new(auth.clone()));
        let permission_service = Arc::new(PermissionService::new(storage.clone()));
        let entity_service = Arc::new(EntityService::new(storage.clone(), change_feed.clone()));

        let admin = create_test_user(storage.clone(), ADMIN_EMAIL, true).await;
        let user = create_test_user(storage.clone(), "tech@lab.test", false).await;
        let admin_token = token_service.generate_token(admin.clone()).unwrap().token;
        let token = token_service.generate_token(user.clone()).unwrap().token;

        Self {
            router: Router::new(),
            storage,
            auth,
            change_feed,
            token_service,
            permission_service,
            entity_service,
            admin,
            user,
            admin_token,
            token,
        }
    }

    fn token_state(&self) -> TokenState {
        TokenState {
            token_service: self.token_service.clone(),
        }
    }

    fn merge(mut self, router: Router) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn with_auth_handle(self) -> Self {
        let router = auth_router(
            AuthState {
                auth_service: Arc::new(AuthService::new()),
                token_service: self.token_service.clone(),
                user_repository: Arc::new(UserRepository::new(self.storage.clone())),
                auth: Arc::new(self.auth.clone()),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_user_handle(self) -> Self {
        let router = user_router(
            UserState {
                user_repository: Arc::new(UserRepository::new(self.storage.clone())),
                permission_service: self.permission_service.clone(),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_room_handle(self) -> Self {
        let router = room_router(
            RoomState {
                entity_service: self.entity_service.clone(),
                permission_service: self.permission_service.clone(),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_equipment_handle(self) -> Self {
        let router = equipment_router(
            EquipmentState {
                entity_service: self.entity_service.clone(),
                permission_service: self.permission_service.clone(),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_reading_handle(self) -> Self {
        let router = reading_router(
            ReadingState {
                reading_service: Arc::new(ReadingService::new(
                    self.storage.clone(),
                    self.permission_service.clone(),
                    self.change_feed.clone(),
                )),
                permission_service: self.permission_service.clone(),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_scan_handle(self) -> Self {
        let router = scan_router(
            ScanState {
                resolver_service: Arc::new(ResolverService::new(self.storage.clone())),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_dashboard_handle(self) -> Self {
        let router = dashboard_router(
            DashboardState {
                dashboard_service: Arc::new(DashboardService::new(self.storage.clone())),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_report_handle(self) -> Self {
        let router = report_router(
            ReportState {
                report_service: Arc::new(ReportService::new(
                    self.storage.clone(),
                    &Report::default(),
                )),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    pub fn with_event_handle(self) -> Self {
        let router = event_router(
            EventState {
                change_feed: self.change_feed.clone(),
            },
            self.token_state(),
        );
        self.merge(router)
    }

    /// Sends a request as the holder of `token`, returning the status and parsed JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };

        (status, value)
    }
}
