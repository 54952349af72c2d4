mod equipment;
mod equipment_inspection;
mod equipment_temperature_log;
mod room;
mod temperature_log;
mod user;

pub use equipment::EquipmentRepository;
pub use equipment_inspection::EquipmentInspectionRepository;
pub use equipment_temperature_log::EquipmentTemperatureLogRepository;
pub use room::RoomRepository;
pub use temperature_log::TemperatureLogRepository;
pub use user::UserRepository;

use time::OffsetDateTime;

/// Bounds shared by the record listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordRange {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub limit: u32,
}
