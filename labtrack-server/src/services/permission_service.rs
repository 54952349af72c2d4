use std::sync::Arc;

use crate::configs::Storage;
use crate::errors::{ApiError, AuthError};

/// Role checks read the stored role, so a demotion takes effect before the token expires.
#[derive(Clone)]
pub struct PermissionService {
    storage: Arc<Storage>,
}

impl PermissionService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn is_admin(&self, user_id: i32) -> Result<bool, sqlx::Error> {
        let result: Option<bool> =
            sqlx::query_scalar("SELECT role = 'admin' FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(result.unwrap_or(false))
    }

    pub async fn user_exists(&self, user_id: i32) -> Result<bool, sqlx::Error> {
        let result: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(self.storage.get_pool())
            .await?;

        Ok(result)
    }

    /// Fails unless the user still exists.
    pub async fn require_user(&self, user_id: i32) -> Result<(), ApiError> {
        if !self.user_exists(user_id).await? {
            return Err(AuthError::Unauthenticated.into());
        }

        Ok(())
    }

    pub async fn require_admin(&self, user_id: i32) -> Result<(), ApiError> {
        if !self.is_admin(user_id).await? {
            return Err(AuthError::InsufficientPermission.into());
        }

        Ok(())
    }
}
