use labtrack_api::models::{Condition, InspectionResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EquipmentInspection {
    pub id: i32,
    pub equipment_id: i32,
    /// `bagus` or `tidak_bagus`
    pub condition: String,
    pub notes: Option<String>,
    pub inspected_by: Option<i32>,
    pub inspected_at: OffsetDateTime,
    #[sqlx(default)]
    pub equipment_name: Option<String>,
}

impl EquipmentInspection {
    pub fn condition(&self) -> Option<Condition> {
        Condition::parse(&self.condition)
    }
}

impl TryFrom<EquipmentInspection> for InspectionResponse {
    type Error = String;

    fn try_from(inspection: EquipmentInspection) -> Result<Self, Self::Error> {
        let condition = inspection.condition().ok_or_else(|| {
            format!(
                "inspection {} has unknown condition {}",
                inspection.id, inspection.condition
            )
        })?;

        Ok(Self {
            id: inspection.id,
            equipment_id: inspection.equipment_id,
            equipment_name: inspection.equipment_name,
            condition,
            notes: inspection.notes,
            inspected_by: inspection.inspected_by,
            inspected_at: inspection.inspected_at,
        })
    }
}

#[derive(Clone)]
pub struct EquipmentInspectionTable;

impl Table for EquipmentInspectionTable {
    fn name(&self) -> &'static str {
        "equipment_inspections"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS equipment_inspections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id INTEGER NOT NULL,
                condition TEXT NOT NULL CHECK (condition IN ('bagus', 'tidak_bagus')),
                notes TEXT,
                inspected_by INTEGER,
                inspected_at TIMESTAMP NOT NULL,
                FOREIGN KEY (equipment_id) REFERENCES equipment (id),
                FOREIGN KEY (inspected_by) REFERENCES users (id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_equipment_inspections_equipment_time
                ON equipment_inspections (equipment_id, inspected_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS equipment_inspections;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["equipment", "users"]
    }
}
