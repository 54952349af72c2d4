use serde::{Deserialize, Serialize};

/// Aggregate figures for the dashboard header cards.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Mean of the latest temperature of every room and temperature equipment.
    pub average_temperature: Option<f64>,
    /// Rooms plus equipment of any kind.
    pub total_assets: u32,
    /// Warning or critical temperature assets plus inspections in bad condition.
    pub attention_count: u32,
    pub normal_count: u32,
    pub warning_count: u32,
    pub critical_count: u32,
    pub inspection_good: u32,
    pub inspection_not_good: u32,
}
