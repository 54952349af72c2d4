use std::sync::Arc;

use labtrack_api::models::{LoginRequest, UserResponse};
use reqwest::Method;
use url::Url;

use crate::backend::{HttpBackend, build_client, build_feed_client, endpoint, read_json};
use crate::cache::LatestReadingCache;
use crate::error::{ClientError, ErrorBody, Result, from_status};
use crate::events::ChangeSubscription;

/// Signed-in operator.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
}

/// Application-wide state passed to every view: server address, the signed-in session
/// and the latest-reading projections. Created once at startup.
pub struct AppContext {
    http_client: reqwest::Client,
    base_url: Url,
    session: Option<Session>,
    cache: Arc<LatestReadingCache>,
}

impl AppContext {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http_client: build_client(),
            base_url: Url::parse(base_url)?,
            session: None,
            cache: Arc::new(LatestReadingCache::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&Session> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let response = self
            .http_client
            .request(Method::POST, endpoint(&self.base_url, &["api", "auth", "login"])?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(from_status(status, ErrorBody::parse(&bytes)));
        }
        let token = response.text().await?;

        let response = self
            .http_client
            .request(Method::GET, endpoint(&self.base_url, &["api", "auth", "me"])?)
            .bearer_auth(&token)
            .send()
            .await?;
        let user: UserResponse = read_json(response).await?;

        log::info!("signed in as {} ({})", user.email, user.role);
        self.cache.clear();

        Ok(&*self.session.insert(Session { token, user }))
    }

    /// Drops the session and every cached projection.
    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("signed out {}", session.user.email);
        }
        self.cache.clear();
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn acting_user(&self) -> Option<&UserResponse> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Backend authenticated as the current user.
    pub fn backend(&self) -> Result<HttpBackend> {
        let session = self.session.as_ref().ok_or(ClientError::Unauthenticated)?;

        Ok(HttpBackend::new(
            self.http_client.clone(),
            self.base_url.clone(),
            session.token.clone(),
        ))
    }

    pub fn cache(&self) -> Arc<LatestReadingCache> {
        self.cache.clone()
    }

    /// Fills the latest-reading cache from the dashboard projections.
    pub async fn refresh_latest(&self) -> Result<usize> {
        self.cache.refresh(&self.backend()?).await
    }

    /// Starts applying the server's change feed to the cache until the returned
    /// subscription is dropped.
    pub async fn watch_changes(&self) -> Result<ChangeSubscription> {
        let session = self.session.as_ref().ok_or(ClientError::Unauthenticated)?;
        let url = endpoint(&self.base_url, &["api", "events"])?;

        ChangeSubscription::connect(
            build_feed_client(),
            url,
            session.token.clone(),
            self.cache.clone(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use labtrack_api::models::UserRole;
    use time::OffsetDateTime;

    use super::*;
    use crate::cache::CachedReading;
    use crate::tests::room_reading;

    fn signed_in() -> AppContext {
        let mut context = AppContext::new("http://127.0.0.1:3000").unwrap();
        context.session = Some(Session {
            token: String::from("token"),
            user: UserResponse {
                id: 1,
                email: String::from("tech@lab.test"),
                full_name: None,
                role: UserRole::User,
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        });
        context
    }

    #[tokio::test]
    async fn test_backend_requires_session() {
        let context = AppContext::new("http://127.0.0.1:3000").unwrap();
        assert!(context.acting_user().is_none());
        assert!(matches!(context.backend(), Err(ClientError::Unauthenticated)));
        assert!(matches!(
            context.watch_changes().await,
            Err(ClientError::Unauthenticated)
        ));

        assert!(matches!(
            AppContext::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_sign_out_clears_session_and_cache() {
        let mut context = signed_in();
        assert_eq!(context.acting_user().map(|user| user.id), Some(1));
        assert!(context.backend().is_ok());

        context.cache().put(CachedReading::Room(room_reading(1, 1, 21.0)));

        context.sign_out();
        assert!(context.session().is_none());
        assert!(context.cache().is_empty());
        assert!(context.backend().is_err());
    }
}
