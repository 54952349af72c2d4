use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use labtrack_api::models::ReportQuery;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::configs::{Report, Storage};
use crate::errors::{ApiError, ReportError};
use crate::models::{User, stored_time};
use crate::repositories::{
    EquipmentInspectionRepository, EquipmentRepository, EquipmentTemperatureLogRepository,
    RecordRange, RoomRepository, TemperatureLogRepository, UserRepository,
};

/// A rendered export ready to download.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    category: &'static str,
    time: String,
    asset: &'a str,
    location: &'a str,
    temperature: Option<f64>,
    humidity: Option<f64>,
    condition: Option<&'static str>,
    notes: Option<&'a str>,
    recorded_by: &'a str,
}

#[derive(Clone)]
pub struct ReportService {
    room_repository: Arc<RoomRepository>,
    equipment_repository: Arc<EquipmentRepository>,
    temperature_log_repository: Arc<TemperatureLogRepository>,
    equipment_temperature_log_repository: Arc<EquipmentTemperatureLogRepository>,
    equipment_inspection_repository: Arc<EquipmentInspectionRepository>,
    user_repository: Arc<UserRepository>,
    max_rows: u32,
}

impl ReportService {
    pub fn new(storage: Arc<Storage>, report: &Report) -> Self {
        Self {
            room_repository: Arc::new(RoomRepository::new(storage.clone())),
            equipment_repository: Arc::new(EquipmentRepository::new(storage.clone())),
            temperature_log_repository: Arc::new(TemperatureLogRepository::new(storage.clone())),
            equipment_temperature_log_repository: Arc::new(
                EquipmentTemperatureLogRepository::new(storage.clone()),
            ),
            equipment_inspection_repository: Arc::new(EquipmentInspectionRepository::new(
                storage.clone(),
            )),
            user_repository: Arc::new(UserRepository::new(storage)),
            max_rows: report.max_rows,
        }
    }

    /// Renders the selected categories as CSV, newest record first within each category.
    pub async fn export_csv(
        &self,
        query: &ReportQuery,
        generated_at: OffsetDateTime,
    ) -> Result<ReportFile, ApiError> {
        if query.from > query.to {
            return Err(ReportError::InvalidRange.into());
        }
        if !query.has_category() {
            return Err(ReportError::NoCategory.into());
        }

        let range = RecordRange {
            from: Some(stored_time(query.from)),
            to: Some(stored_time(query.to)),
            limit: self.max_rows,
        };

        let room_logs = if query.rooms {
            self.temperature_log_repository.find_in_range_desc(range).await?
        } else {
            Vec::new()
        };
        let equipment_logs = if query.equipment {
            self.equipment_temperature_log_repository
                .find_in_range_desc(range)
                .await?
        } else {
            Vec::new()
        };
        let inspections = if query.inspections {
            self.equipment_inspection_repository
                .find_by_equipment(None, range)
                .await?
        } else {
            Vec::new()
        };

        if room_logs.is_empty() && equipment_logs.is_empty() && inspections.is_empty() {
            return Err(ReportError::NoData.into());
        }

        let room_locations: HashMap<i32, String> = self
            .room_repository
            .find_all()
            .await?
            .into_iter()
            .map(|room| (room.id, room.location))
            .collect();
        let equipment_locations: HashMap<i32, String> = self
            .equipment_repository
            .find_all()
            .await?
            .into_iter()
            .map(|equipment| (equipment.id, equipment.location))
            .collect();

        let mut recorder_ids: Vec<i32> = room_logs
            .iter()
            .filter_map(|log| log.recorded_by)
            .chain(equipment_logs.iter().filter_map(|log| log.recorded_by))
            .chain(inspections.iter().filter_map(|i| i.inspected_by))
            .collect();
        recorder_ids.sort_unstable();
        recorder_ids.dedup();
        let recorders: HashMap<i32, User> = self
            .user_repository
            .find_by_ids(&recorder_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut rows = 0;

        for log in &room_logs {
            writer
                .serialize(ReportRow {
                    category: "room",
                    time: format_time(log.recorded_at)?,
                    asset: log.room_name.as_deref().unwrap_or("-"),
                    location: location_of(&room_locations, log.room_id),
                    temperature: Some(log.temperature),
                    humidity: log.humidity,
                    condition: None,
                    notes: None,
                    recorded_by: recorder_of(&recorders, log.recorded_by),
                })
                .context("failed to write room reading row")?;
            rows += 1;
        }

        for log in &equipment_logs {
            writer
                .serialize(ReportRow {
                    category: "equipment",
                    time: format_time(log.recorded_at)?,
                    asset: log.equipment_name.as_deref().unwrap_or("-"),
                    location: location_of(&equipment_locations, log.equipment_id),
                    temperature: Some(log.temperature),
                    humidity: None,
                    condition: None,
                    notes: None,
                    recorded_by: recorder_of(&recorders, log.recorded_by),
                })
                .context("failed to write equipment reading row")?;
            rows += 1;
        }

        for inspection in &inspections {
            writer
                .serialize(ReportRow {
                    category: "inspection",
                    time: format_time(inspection.inspected_at)?,
                    asset: inspection.equipment_name.as_deref().unwrap_or("-"),
                    location: location_of(&equipment_locations, inspection.equipment_id),
                    temperature: None,
                    humidity: None,
                    condition: inspection.condition().map(|condition| condition.as_str()),
                    notes: inspection.notes.as_deref(),
                    recorded_by: recorder_of(&recorders, inspection.inspected_by),
                })
                .context("failed to write inspection row")?;
            rows += 1;
        }

        let content = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush report: {}", e.error()))?;

        tracing::info!("exported report with {rows} rows");

        Ok(ReportFile {
            filename: report_filename(generated_at)?,
            content,
            rows,
        })
    }
}

fn location_of(locations: &HashMap<i32, String>, id: i32) -> &str {
    locations.get(&id).map(String::as_str).unwrap_or("")
}

fn recorder_of(recorders: &HashMap<i32, User>, id: Option<i32>) -> &str {
    id.and_then(|id| recorders.get(&id))
        .map(User::display_name)
        .unwrap_or("-")
}

fn format_time(time: OffsetDateTime) -> Result<String, ApiError> {
    Ok(time.format(&Rfc3339).context("failed to format record time")?)
}

pub fn report_filename(generated_at: OffsetDateTime) -> Result<String, ApiError> {
    let stamp = generated_at
        .format(format_description!("[year][month][day]_[hour][minute]"))
        .context("failed to format report timestamp")?;

    Ok(format!("lab_report_{stamp}.csv"))
}

#[cfg(test)]
mod tests {
    use labtrack_api::models::{Condition, EquipmentKind};
    use time::macros::datetime;

    use crate::tests::*;

    use super::*;

    fn query(rooms: bool, equipment: bool, inspections: bool) -> ReportQuery {
        ReportQuery {
            from: datetime!(2024-05-01 00:00 UTC),
            to: datetime!(2024-05-31 23:59 UTC),
            rooms,
            equipment,
            inspections,
        }
    }

    fn service(storage: Arc<Storage>) -> ReportService {
        ReportService::new(storage, &Report::default())
    }

    #[test]
    fn test_report_filename() {
        let filename = report_filename(datetime!(2024-05-07 09:05 UTC)).unwrap();

        assert_eq!(filename, "lab_report_20240507_0905.csv");
    }

    #[tokio::test]
    async fn test_export_rows_newest_first_with_recorder() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        create_test_temperature_log(storage.clone(), room.id, Some(user.id), 21.5, datetime!(2024-05-02 08:00 UTC)).await;
        create_test_temperature_log(storage.clone(), room.id, None, 23.5, datetime!(2024-05-03 08:00 UTC)).await;
        create_test_temperature_log(storage.clone(), room.id, None, 30.0, datetime!(2024-06-03 08:00 UTC)).await;

        let report = service(storage)
            .export_csv(&query(true, false, false), datetime!(2024-06-01 10:00 UTC))
            .await
            .unwrap();
        let content = String::from_utf8(report.content).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(report.rows, 2);
        assert_eq!(
            lines[0],
            "category,time,asset,location,temperature,humidity,condition,notes,recorded_by"
        );
        assert!(lines[1].contains("23.5"));
        assert!(lines[1].ends_with(",-"));
        assert!(lines[2].ends_with("tech@lab.org"));
    }

    #[tokio::test]
    async fn test_export_inspections() {
        let storage = setup_test_db().await;
        let autoclave = create_test_equipment(storage.clone(), "Autoclave", "EQ-001", Some(EquipmentKind::Inspection)).await;
        create_test_inspection(storage.clone(), autoclave.id, None, Condition::TidakBagus, datetime!(2024-05-02 08:00 UTC)).await;

        let report = service(storage)
            .export_csv(&query(false, false, true), datetime!(2024-06-01 10:00 UTC))
            .await
            .unwrap();
        let content = String::from_utf8(report.content).unwrap();

        assert!(content.contains("inspection,2024-05-02T08:00:00Z,Autoclave,Gedung A,,,tidak_bagus,,-"));
    }

    #[tokio::test]
    async fn test_export_without_data() {
        let storage = setup_test_db().await;

        let result = service(storage)
            .export_csv(&query(true, true, true), datetime!(2024-06-01 10:00 UTC))
            .await;

        assert!(matches!(
            result,
            Err(ApiError::ReportError(ReportError::NoData))
        ));
    }

    #[tokio::test]
    async fn test_export_rejects_bad_requests() {
        let storage = setup_test_db().await;
        let service = service(storage);

        let reversed = ReportQuery {
            from: datetime!(2024-06-01 00:00 UTC),
            to: datetime!(2024-05-01 00:00 UTC),
            ..query(true, false, false)
        };
        assert!(matches!(
            service.export_csv(&reversed, datetime!(2024-06-01 10:00 UTC)).await,
            Err(ApiError::ReportError(ReportError::InvalidRange))
        ));
        assert!(matches!(
            service
                .export_csv(&query(false, false, false), datetime!(2024-06-01 10:00 UTC))
                .await,
            Err(ApiError::ReportError(ReportError::NoCategory))
        ));
    }
}
