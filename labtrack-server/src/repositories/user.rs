use std::sync::Arc;

use sqlx::{Error, Pool, QueryBuilder, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::User;

#[derive(Clone)]
pub struct UserRepository {
    storage: Arc<Storage>,
}

impl UserRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl UserRepository {
    pub async fn create(
        &self,
        item: &User,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO users (email, password, full_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&item.email)
        .bind(&item.password)
        .bind(&item.full_name)
        .bind(&item.role)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, Error> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user: Option<User> =
            sqlx::query_as("SELECT * FROM users WHERE email = $1 COLLATE NOCASE")
                .bind(email)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(user)
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        query
            .build_query_as::<User>()
            .fetch_all(self.storage.get_pool())
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<User>, Error> {
        let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY email")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(users)
    }

    pub async fn update_role(
        &self,
        id: i32,
        role: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
