use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Date range and data categories of an export.
#[cfg_attr(feature = "docs", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "docs", into_params(parameter_in = Query))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(with = "time::serde::rfc3339")]
    pub from: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to: OffsetDateTime,
    #[serde(default)]
    pub rooms: bool,
    #[serde(default)]
    pub equipment: bool,
    #[serde(default)]
    pub inspections: bool,
}

impl ReportQuery {
    pub fn has_category(&self) -> bool {
        self.rooms || self.equipment || self.inspections
    }
}
