use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::reading::TemperatureLogResponse;
use crate::status::{Status, ThresholdProfile};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Display name.
    pub name: String,
    /// Free-text placement, e.g. building and floor.
    #[serde(default)]
    pub location: String,
    /// Scannable identifier code printed on the room label.
    pub barcode: String,
    /// Explicit classification band; inferred from the name when absent.
    #[serde(default)]
    pub threshold_profile: Option<ThresholdProfile>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateRoomRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub threshold_profile: Option<ThresholdProfile>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub barcode: String,
    pub threshold_profile: Option<ThresholdProfile>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl RoomResponse {
    /// Profile used for classification: the explicit one, else the name heuristic.
    pub fn effective_profile(&self) -> ThresholdProfile {
        self.threshold_profile
            .unwrap_or_else(|| ThresholdProfile::infer_from_name(&self.name))
    }
}

/// Room joined with its most recent reading, as shown on dashboard cards.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomWithLatestReading {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub latest_reading: Option<TemperatureLogResponse>,
    pub status: Status,
}
