use std::sync::Arc;

use sqlx::{Error, Pool, QueryBuilder, Sqlite, Transaction};

use super::RecordRange;
use crate::configs::Storage;
use crate::models::EquipmentInspection;

const SELECT_WITH_EQUIPMENT: &str = r#"
    SELECT i.*, e.name AS equipment_name
    FROM equipment_inspections i
    LEFT JOIN equipment e ON e.id = i.equipment_id
"#;

#[derive(Clone)]
pub struct EquipmentInspectionRepository {
    storage: Arc<Storage>,
}

impl EquipmentInspectionRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl EquipmentInspectionRepository {
    pub async fn create(
        &self,
        item: &EquipmentInspection,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO equipment_inspections (equipment_id, condition, notes, inspected_by, inspected_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.equipment_id)
        .bind(&item.condition)
        .bind(&item.notes)
        .bind(item.inspected_by)
        .bind(item.inspected_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<EquipmentInspection>, Error> {
        let inspection: Option<EquipmentInspection> =
            sqlx::query_as(&format!("{SELECT_WITH_EQUIPMENT} WHERE i.id = $1"))
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(inspection)
    }

    /// Newest first, like the inspection history view.
    pub async fn find_by_equipment(
        &self,
        equipment_id: Option<i32>,
        range: RecordRange,
    ) -> Result<Vec<EquipmentInspection>, Error> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_WITH_EQUIPMENT);
        query.push(" WHERE 1 = 1");
        if let Some(equipment_id) = equipment_id {
            query.push(" AND i.equipment_id = ").push_bind(equipment_id);
        }
        if let Some(from) = range.from {
            query.push(" AND i.inspected_at >= ").push_bind(from);
        }
        if let Some(to) = range.to {
            query.push(" AND i.inspected_at <= ").push_bind(to);
        }
        query
            .push(" ORDER BY i.inspected_at DESC, i.id DESC LIMIT ")
            .push_bind(range.limit);

        query
            .build_query_as::<EquipmentInspection>()
            .fetch_all(self.storage.get_pool())
            .await
    }

    pub async fn find_latest_per_equipment(&self) -> Result<Vec<EquipmentInspection>, Error> {
        let inspections: Vec<EquipmentInspection> = sqlx::query_as(&format!(
            r#"
            {SELECT_WITH_EQUIPMENT}
            WHERE i.id = (
                SELECT latest.id FROM equipment_inspections latest
                WHERE latest.equipment_id = i.equipment_id
                ORDER BY latest.inspected_at DESC, latest.id DESC
                LIMIT 1
            )
            "#
        ))
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(inspections)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &EquipmentInspection,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE equipment_inspections
            SET condition = $1, notes = $2, inspected_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&item.condition)
        .bind(&item.notes)
        .bind(item.inspected_at)
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
        let result = sqlx::query("DELETE FROM equipment_inspections WHERE id = $1")
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
        let result = sqlx::query("DELETE FROM equipment_inspections WHERE equipment_id = $1")
            .bind(equipment_id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
