use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Tables observable through the change feed.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Rooms,
    Equipment,
    TemperatureLogs,
    EquipmentTemperatureLogs,
    EquipmentInspections,
}

impl ChangeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTable::Rooms => "rooms",
            ChangeTable::Equipment => "equipment",
            ChangeTable::TemperatureLogs => "temperature_logs",
            ChangeTable::EquipmentTemperatureLogs => "equipment_temperature_logs",
            ChangeTable::EquipmentInspections => "equipment_inspections",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "rooms" => Some(ChangeTable::Rooms),
            "equipment" => Some(ChangeTable::Equipment),
            "temperature_logs" => Some(ChangeTable::TemperatureLogs),
            "equipment_temperature_logs" => Some(ChangeTable::EquipmentTemperatureLogs),
            "equipment_inspections" => Some(ChangeTable::EquipmentInspections),
            _ => None,
        }
    }
}

impl Display for ChangeTable {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification that a row changed. A hint to refetch, never authoritative data.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub id: i32,
    /// Owning room or equipment for reading tables.
    pub entity_id: Option<i32>,
}
