use std::sync::Arc;

use sqlx::{Error, Pool, QueryBuilder, Sqlite, Transaction};

use super::RecordRange;
use crate::configs::Storage;
use crate::models::EquipmentTemperatureLog;

const SELECT_WITH_EQUIPMENT: &str = r#"
    SELECT t.*, e.name AS equipment_name
    FROM equipment_temperature_logs t
    LEFT JOIN equipment e ON e.id = t.equipment_id
"#;

#[derive(Clone)]
pub struct EquipmentTemperatureLogRepository {
    storage: Arc<Storage>,
}

impl EquipmentTemperatureLogRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl EquipmentTemperatureLogRepository {
    pub async fn create(
        &self,
        item: &EquipmentTemperatureLog,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO equipment_temperature_logs (equipment_id, temperature, recorded_by, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.equipment_id)
        .bind(item.temperature)
        .bind(item.recorded_by)
        .bind(item.recorded_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<EquipmentTemperatureLog>, Error> {
        let log: Option<EquipmentTemperatureLog> =
            sqlx::query_as(&format!("{SELECT_WITH_EQUIPMENT} WHERE t.id = $1"))
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(log)
    }

    pub async fn find_by_equipment(
        &self,
        equipment_id: Option<i32>,
        range: RecordRange,
    ) -> Result<Vec<EquipmentTemperatureLog>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_WITH_EQUIPMENT);
        query.push(" WHERE 1 = 1");
        if let Some(equipment_id) = equipment_id {
            query.push(" AND t.equipment_id = ").push_bind(equipment_id);
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
            .build_query_as::<EquipmentTemperatureLog>()
            .fetch_all(self.storage.get_pool())
            .await
    }

    pub async fn find_in_range_desc(
        &self,
        range: RecordRange,
    ) -> Result<Vec<EquipmentTemperatureLog>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_WITH_EQUIPMENT);
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
            .build_query_as::<EquipmentTemperatureLog>()
            .fetch_all(self.storage.get_pool())
            .await
    }

    pub async fn find_latest_per_equipment(&self) -> Result<Vec<EquipmentTemperatureLog>, Error> {
        let logs: Vec<EquipmentTemperatureLog> = sqlx::query_as(&format!(
            r#"
            {SELECT_WITH_EQUIPMENT}
            WHERE t.id = (
                SELECT latest.id FROM equipment_temperature_logs latest
                WHERE latest.equipment_id = t.equipment_id
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
        item: &EquipmentTemperatureLog,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE equipment_temperature_logs
            SET temperature = $1, recorded_at = $2
            WHERE id = $3
            "#,
        )
        .bind(item.temperature)
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
        let result = sqlx::query("DELETE FROM equipment_temperature_logs WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_equipment(
        &self,
        equipment_id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM equipment_temperature_logs WHERE equipment_id = $1")
            .bind(equipment_id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
