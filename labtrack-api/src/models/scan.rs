use serde::{Deserialize, Serialize};

use super::equipment::{EquipmentKind, EquipmentResponse};
use super::room::RoomResponse;
use crate::status::ThresholdProfile;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Raw decoded scan payload or typed code.
    pub payload: String,
}

/// Reference to an entity by id, as chosen from a list or embedded in a deep link.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "lowercase")]
pub enum EntityId {
    Room(i32),
    Equipment(i32),
}

/// A concrete Room or Equipment record produced by identifier resolution.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum ResolvedEntity {
    Room(RoomResponse),
    Equipment(EquipmentResponse),
}

impl ResolvedEntity {
    pub fn entity_id(&self) -> EntityId {
        match self {
            ResolvedEntity::Room(room) => EntityId::Room(room.id),
            ResolvedEntity::Equipment(equipment) => EntityId::Equipment(equipment.id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResolvedEntity::Room(room) => &room.name,
            ResolvedEntity::Equipment(equipment) => &equipment.name,
        }
    }

    pub fn barcode(&self) -> &str {
        match self {
            ResolvedEntity::Room(room) => &room.barcode,
            ResolvedEntity::Equipment(equipment) => &equipment.barcode,
        }
    }

    pub fn effective_profile(&self) -> ThresholdProfile {
        match self {
            ResolvedEntity::Room(room) => room.effective_profile(),
            ResolvedEntity::Equipment(equipment) => equipment.effective_profile(),
        }
    }

    /// The reading kind when it is unambiguous. Rooms always take temperature readings.
    pub fn inferred_kind(&self) -> Option<EquipmentKind> {
        match self {
            ResolvedEntity::Room(_) => Some(EquipmentKind::Temperature),
            ResolvedEntity::Equipment(equipment) => equipment.kind,
        }
    }

    /// Humidity is only recorded for rooms.
    pub fn records_humidity(&self) -> bool {
        matches!(self, ResolvedEntity::Room(_))
    }
}
