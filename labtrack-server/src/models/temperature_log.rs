use labtrack_api::models::TemperatureLogResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TemperatureLog {
    pub id: i32,
    pub room_id: i32,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub recorded_by: Option<i32>,
    pub recorded_at: OffsetDateTime,
    /// Joined from `rooms` on reads.
    #[sqlx(default)]
    pub room_name: Option<String>,
}

impl From<TemperatureLog> for TemperatureLogResponse {
    fn from(log: TemperatureLog) -> Self {
        Self {
            id: log.id,
            room_id: log.room_id,
            room_name: log.room_name,
            temperature: log.temperature,
            humidity: log.humidity,
            recorded_by: log.recorded_by,
            recorded_at: log.recorded_at,
        }
    }
}

#[derive(Clone)]
pub struct TemperatureLogTable;

impl Table for TemperatureLogTable {
    fn name(&self) -> &'static str {
        "temperature_logs"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS temperature_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_id INTEGER NOT NULL,
                temperature REAL NOT NULL,
                humidity REAL,
                recorded_by INTEGER,
                recorded_at TIMESTAMP NOT NULL,
                FOREIGN KEY (room_id) REFERENCES rooms (id),
                FOREIGN KEY (recorded_by) REFERENCES users (id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_temperature_logs_room_time
                ON temperature_logs (room_id, recorded_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS temperature_logs;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["rooms", "users"]
    }
}
