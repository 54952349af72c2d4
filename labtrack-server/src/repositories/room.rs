use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Room;

#[derive(Clone)]
pub struct RoomRepository {
    storage: Arc<Storage>,
}

impl RoomRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl RoomRepository {
    pub async fn create(
        &self,
        item: &Room,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO rooms (name, location, barcode, threshold_profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&item.name)
        .bind(&item.location)
        .bind(&item.barcode)
        .bind(&item.threshold_profile)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Room>, Error> {
        let room: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(room)
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Room>, Error> {
        let room: Option<Room> = sqlx::query_as("SELECT * FROM rooms WHERE barcode = $1")
            .bind(barcode)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(room)
    }

    pub async fn find_all(&self) -> Result<Vec<Room>, Error> {
        let rooms: Vec<Room> = sqlx::query_as("SELECT * FROM rooms ORDER BY name, id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(rooms)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Room,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET name = $1, location = $2, barcode = $3, threshold_profile = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&item.name)
        .bind(&item.location)
        .bind(&item.barcode)
        .bind(&item.threshold_profile)
        .bind(item.updated_at)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
