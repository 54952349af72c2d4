use std::sync::Arc;

use sqlx::{Error, Pool, QueryBuilder, Sqlite, Transaction};

use super::RecordRange;
use crate::configs::Storage;
use crate::models::TemperatureLog;

const SELECT_WITH_ROOM: &str = r#"
    SELECT t.*, r.name AS room_name
    FROM temperature_logs t
    LEFT JOIN rooms r ON r.id = t.room_id
"#;

#[derive(Clone)]
pub struct TemperatureLogRepository {
    storage: Arc<Storage>,
}

impl TemperatureLogRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl TemperatureLogRepository {
    pub async fn create(
        &self,
        item: &TemperatureLog,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO temperature_logs (room_id, temperature, humidity, recorded_by, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.room_id)
        .bind(item.temperature)
        .bind(item.humidity)
        .bind(item.recorded_by)
        .bind(item.recorded_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<TemperatureLog>, Error> {
        let log: Option<TemperatureLog> =
            sqlx::query_as(&format!("{SELECT_WITH_ROOM} WHERE t.id = $1"))
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(log)
    }

    /// Oldest first, for charts and listings.
    pub async fn find_by_room(
        &self,
        room_id: Option<i32>,
        range: RecordRange,
    ) -> Result<Vec<TemperatureLog>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_WITH_ROOM);
        query.push(" WHERE 1 = 1");
        if let Some(room_id) = room_id {
            query.push(" AND t.room_id = ").push_bind(room_id);
        }
        if let Some(from) = range.from {
            query.push(" AND t.recorded_at >= ").push_bind(from);
        }
        if let Some(to) = range.to {
            query.push(" AND t.recorded_at <= ").push_bind(to);
        }
        query
            .push(" ORDER BY t.recorded_at ASC, t.id ASC LIMIT ")
            .push_bind(range.limit);

        query
            .build_query_as::<TemperatureLog>()
            .fetch_all(self.storage.get_pool())
            .await
    }

    /// Newest first, for exports.
    pub async fn find_in_range_desc(&self, range: RecordRange) -> Result<Vec<TemperatureLog>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_WITH_ROOM);
        query.push(" WHERE 1 = 1");
        if let Some(from) = range.from {
            query.push(" AND t.recorded_at >= ").push_bind(from);
        }
        if let Some(to) = range.to {
            query.push(" AND t.recorded_at <= ").push_bind(to);
        }
        query
            .push(" ORDER BY t.recorded_at DESC, t.id DESC LIMIT ")
            .push_bind(range.limit);

        query
            .build_query_as::<TemperatureLog>()
            .fetch_all(self.storage.get_pool())
            .await
    }

    /// The newest reading of every room that has one.
    pub async fn find_latest_per_room(&self) -> Result<Vec<TemperatureLog>, Error> {
        let logs: Vec<TemperatureLog> = sqlx::query_as(&format!(
            r#"
            {SELECT_WITH_ROOM}
            WHERE t.id = (
                SELECT latest.id FROM temperature_logs latest
                WHERE latest.room_id = t.room_id
                ORDER BY latest.recorded_at DESC, latest.id DESC
                LIMIT 1
            )
            "#
        ))
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(logs)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &TemperatureLog,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE temperature_logs
            SET temperature = $1, humidity = $2, recorded_at = $3
            WHERE id = $4
            "#,
        )
        .bind(item.temperature)
        .bind(item.humidity)
        .bind(item.recorded_at)
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
        let result = sqlx::query("DELETE FROM temperature_logs WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_room(
        &self,
        room_id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM temperature_logs WHERE room_id = $1")
            .bind(room_id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
