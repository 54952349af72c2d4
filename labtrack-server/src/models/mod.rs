use time::{Duration, OffsetDateTime, UtcOffset};

mod equipment;
mod equipment_inspection;
mod equipment_temperature_log;
mod room;
mod temperature_log;
mod user;

pub use equipment::{Equipment, EquipmentTable};
pub use equipment_inspection::{EquipmentInspection, EquipmentInspectionTable};
pub use equipment_temperature_log::{EquipmentTemperatureLog, EquipmentTemperatureLogTable};
pub use room::{Room, RoomTable};
pub(crate) use room::encode_profile;
pub use temperature_log::{TemperatureLog, TemperatureLogTable};
pub use user::{User, UserTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;
}

/// Timestamps are persisted in UTC at whole-second precision so that their
/// text form sorts chronologically.
pub fn stored_time(time: OffsetDateTime) -> OffsetDateTime {
    let time = time.to_offset(UtcOffset::UTC);
    time - Duration::nanoseconds(i64::from(time.nanosecond()))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_stored_time_normalizes_offset_and_precision() {
        let local = datetime!(2024-05-01 17:30:15.250 +07:00);
        let stored = stored_time(local);

        assert_eq!(stored, datetime!(2024-05-01 10:30:15 UTC));
        assert_eq!(stored.offset(), UtcOffset::UTC);
    }
}
