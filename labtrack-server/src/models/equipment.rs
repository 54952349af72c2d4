use labtrack_api::models::{EquipmentKind, EquipmentResponse};
use labtrack_api::ThresholdProfile;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::room::decode_profile;
use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub barcode: String,
    /// `temperature`, `inspection` or null when the operator picks per capture.
    pub kind: Option<String>,
    pub threshold_profile: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Equipment {
    pub fn kind(&self) -> Option<EquipmentKind> {
        self.kind.as_deref().and_then(EquipmentKind::parse)
    }

    pub fn profile(&self) -> Option<ThresholdProfile> {
        decode_profile(self.threshold_profile.as_deref())
    }
}

impl From<Equipment> for EquipmentResponse {
    fn from(equipment: Equipment) -> Self {
        Self {
            kind: equipment.kind(),
            threshold_profile: equipment.profile(),
            id: equipment.id,
            name: equipment.name,
            location: equipment.location,
            barcode: equipment.barcode,
            created_at: equipment.created_at,
            updated_at: equipment.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct EquipmentTable;

impl Table for EquipmentTable {
    fn name(&self) -> &'static str {
        "equipment"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS equipment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                barcode TEXT NOT NULL UNIQUE,
                kind TEXT CHECK (kind IN ('temperature', 'inspection')),
                threshold_profile TEXT,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS equipment;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
