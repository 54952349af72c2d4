use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Physical condition recorded by an inspection.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Good.
    Bagus,
    /// Not good.
    TidakBagus,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Bagus => "bagus",
            Condition::TidakBagus => "tidak_bagus",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bagus" => Some(Condition::Bagus),
            "tidak_bagus" => Some(Condition::TidakBagus),
            _ => None,
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTemperatureReadingRequest {
    /// Temperature in Celsius.
    pub temperature: f64,
    /// Relative humidity in percent; rooms only.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Operator-chosen time; the submission time is used when absent.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_at: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTemperatureReadingRequest {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_at: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInspectionRequest {
    pub condition: Condition,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub inspected_at: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInspectionRequest {
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub inspected_at: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureLogResponse {
    pub id: i32,
    pub room_id: i32,
    pub room_name: Option<String>,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub recorded_by: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentTemperatureLogResponse {
    pub id: i32,
    pub equipment_id: i32,
    pub equipment_name: Option<String>,
    pub temperature: f64,
    pub recorded_by: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionResponse {
    pub id: i32,
    pub equipment_id: i32,
    pub equipment_name: Option<String>,
    pub condition: Condition,
    pub notes: Option<String>,
    pub inspected_by: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub inspected_at: OffsetDateTime,
}

/// Query filter shared by the reading listings.
#[cfg_attr(feature = "docs", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "docs", into_params(parameter_in = Query))]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReadingFilter {
    #[serde(default)]
    pub room_id: Option<i32>,
    #[serde(default)]
    pub equipment_id: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
}
