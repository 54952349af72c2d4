use std::sync::Arc;

use labtrack_api::models::EquipmentKind;
use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Equipment;

#[derive(Clone)]
pub struct EquipmentRepository {
    storage: Arc<Storage>,
}

impl EquipmentRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl EquipmentRepository {
    pub async fn create(
        &self,
        item: &Equipment,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO equipment (name, location, barcode, kind, threshold_profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&item.name)
        .bind(&item.location)
        .bind(&item.barcode)
        .bind(&item.kind)
        .bind(&item.threshold_profile)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Equipment>, Error> {
        let equipment: Option<Equipment> = sqlx::query_as("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(equipment)
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Equipment>, Error> {
        let equipment: Option<Equipment> =
            sqlx::query_as("SELECT * FROM equipment WHERE barcode = $1")
                .bind(barcode)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(equipment)
    }

    pub async fn find_all(&self) -> Result<Vec<Equipment>, Error> {
        let equipment: Vec<Equipment> = sqlx::query_as("SELECT * FROM equipment ORDER BY name, id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(equipment)
    }

    /// Equipment that accepts the given kind of record, including unclassified equipment.
    pub async fn find_accepting(&self, kind: EquipmentKind) -> Result<Vec<Equipment>, Error> {
        let equipment: Vec<Equipment> = sqlx::query_as(
            r#"
            SELECT * FROM equipment
            WHERE kind = $1 OR kind IS NULL
            ORDER BY name, id
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(equipment)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Equipment,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET name = $1, location = $2, barcode = $3, kind = $4, threshold_profile = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&item.name)
        .bind(&item.location)
        .bind(&item.barcode)
        .bind(&item.kind)
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
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_find_accepting_includes_unclassified() {
        let storage = setup_test_db().await;
        create_test_equipment(storage.clone(), "Freezer -20", "EQ-001", Some(EquipmentKind::Temperature)).await;
        create_test_equipment(storage.clone(), "Autoclave", "EQ-002", Some(EquipmentKind::Inspection)).await;
        create_test_equipment(storage.clone(), "Centrifuge", "EQ-003", None).await;

        let repo = EquipmentRepository::new(storage.clone());
        let inspectable = repo.find_accepting(EquipmentKind::Inspection).await.unwrap();
        let names: Vec<_> = inspectable.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["Autoclave", "Centrifuge"]);
    }

    #[tokio::test]
    async fn test_find_equipment_by_barcode() {
        let storage = setup_test_db().await;
        let equipment = create_test_equipment(storage.clone(), "Inkubator", "EQ-010", None).await;

        let repo = EquipmentRepository::new(storage.clone());
        let found = repo.find_by_barcode("EQ-010").await.unwrap().unwrap();

        assert_eq!(found.id, equipment.id);
        assert_eq!(found.kind(), None);
    }
}
