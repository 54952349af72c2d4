use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::reading::{EquipmentTemperatureLogResponse, InspectionResponse};
use crate::status::{Status, ThresholdProfile};

/// Which reading shape applies to a piece of equipment.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentKind {
    Temperature,
    Inspection,
}

impl EquipmentKind {
    pub const ALL: [EquipmentKind; 2] = [EquipmentKind::Temperature, EquipmentKind::Inspection];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Temperature => "temperature",
            EquipmentKind::Inspection => "inspection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "temperature" => Some(EquipmentKind::Temperature),
            "inspection" => Some(EquipmentKind::Inspection),
            _ => None,
        }
    }
}

impl Display for EquipmentKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEquipmentRequest {
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub barcode: String,
    /// Left empty for equipment whose reading kind is chosen at capture time.
    #[serde(default)]
    pub kind: Option<EquipmentKind>,
    #[serde(default)]
    pub threshold_profile: Option<ThresholdProfile>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateEquipmentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub kind: Option<EquipmentKind>,
    #[serde(default)]
    pub threshold_profile: Option<ThresholdProfile>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentResponse {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub barcode: String,
    pub kind: Option<EquipmentKind>,
    pub threshold_profile: Option<ThresholdProfile>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl EquipmentResponse {
    pub fn effective_profile(&self) -> ThresholdProfile {
        self.threshold_profile
            .unwrap_or_else(|| ThresholdProfile::infer_from_name(&self.name))
    }

    /// Reading kinds an operator may record against this equipment.
    pub fn supported_kinds(&self) -> Vec<EquipmentKind> {
        match self.kind {
            Some(kind) => vec![kind],
            None => EquipmentKind::ALL.to_vec(),
        }
    }

    pub fn accepts(&self, kind: EquipmentKind) -> bool {
        self.kind.is_none_or(|own| own == kind)
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentWithLatestReading {
    #[serde(flatten)]
    pub equipment: EquipmentResponse,
    pub latest_reading: Option<EquipmentTemperatureLogResponse>,
    pub status: Status,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentWithLatestInspection {
    #[serde(flatten)]
    pub equipment: EquipmentResponse,
    pub latest_inspection: Option<InspectionResponse>,
}
