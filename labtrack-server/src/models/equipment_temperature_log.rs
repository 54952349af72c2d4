use labtrack_api::models::EquipmentTemperatureLogResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EquipmentTemperatureLog {
    pub id: i32,
    pub equipment_id: i32,
    pub temperature: f64,
    pub recorded_by: Option<i32>,
    pub recorded_at: OffsetDateTime,
    #[sqlx(default)]
    pub equipment_name: Option<String>,
}

impl From<EquipmentTemperatureLog> for EquipmentTemperatureLogResponse {
    fn from(log: EquipmentTemperatureLog) -> Self {
        Self {
            id: log.id,
            equipment_id: log.equipment_id,
            equipment_name: log.equipment_name,
            temperature: log.temperature,
            recorded_by: log.recorded_by,
            recorded_at: log.recorded_at,
        }
    }
}

#[derive(Clone)]
pub struct EquipmentTemperatureLogTable;

impl Table for EquipmentTemperatureLogTable {
    fn name(&self) -> &'static str {
        "equipment_temperature_logs"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS equipment_temperature_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id INTEGER NOT NULL,
                temperature REAL NOT NULL,
                recorded_by INTEGER,
                recorded_at TIMESTAMP NOT NULL,
                FOREIGN KEY (equipment_id) REFERENCES equipment (id),
                FOREIGN KEY (recorded_by) REFERENCES users (id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_equipment_temperature_logs_equipment_time
                ON equipment_temperature_logs (equipment_id, recorded_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS equipment_temperature_logs;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["equipment", "users"]
    }
}
