use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use labtrack_api::models::{
    Condition, DashboardSummary, EquipmentKind, EquipmentResponse, EquipmentTemperatureLogResponse,
    EquipmentWithLatestInspection, EquipmentWithLatestReading, InspectionResponse, RoomResponse,
    RoomWithLatestReading, TemperatureLogResponse,
};
use labtrack_api::{Status, ThresholdProfile};

use crate::configs::Storage;
use crate::errors::ApiError;
use crate::repositories::{
    EquipmentInspectionRepository, EquipmentRepository, EquipmentTemperatureLogRepository,
    RoomRepository, TemperatureLogRepository,
};

/// Latest-reading projections and the figures derived from them.
#[derive(Clone)]
pub struct DashboardService {
    room_repository: Arc<RoomRepository>,
    equipment_repository: Arc<EquipmentRepository>,
    temperature_log_repository: Arc<TemperatureLogRepository>,
    equipment_temperature_log_repository: Arc<EquipmentTemperatureLogRepository>,
    equipment_inspection_repository: Arc<EquipmentInspectionRepository>,
}

impl DashboardService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            room_repository: Arc::new(RoomRepository::new(storage.clone())),
            equipment_repository: Arc::new(EquipmentRepository::new(storage.clone())),
            temperature_log_repository: Arc::new(TemperatureLogRepository::new(storage.clone())),
            equipment_temperature_log_repository: Arc::new(
                EquipmentTemperatureLogRepository::new(storage.clone()),
            ),
            equipment_inspection_repository: Arc::new(EquipmentInspectionRepository::new(
                storage,
            )),
        }
    }

    /// Every room with its newest reading. Rooms without readings report `normal`.
    pub async fn rooms(&self) -> Result<Vec<RoomWithLatestReading>, ApiError> {
        let (rooms, latest) = tokio::try_join!(
            self.room_repository.find_all(),
            self.temperature_log_repository.find_latest_per_room(),
        )?;

        let mut latest: HashMap<i32, _> = latest.into_iter().map(|log| (log.room_id, log)).collect();

        Ok(rooms
            .into_iter()
            .map(|room| {
                let room = RoomResponse::from(room);
                let latest_reading = latest.remove(&room.id).map(TemperatureLogResponse::from);
                let status = status_of(
                    &room.effective_profile(),
                    latest_reading.as_ref().map(|reading| reading.temperature),
                );

                RoomWithLatestReading {
                    room,
                    latest_reading,
                    status,
                }
            })
            .collect())
    }

    /// Equipment that takes temperature readings, with its newest one.
    pub async fn equipment(&self) -> Result<Vec<EquipmentWithLatestReading>, ApiError> {
        let (equipment, latest) = tokio::try_join!(
            self.equipment_repository
                .find_accepting(EquipmentKind::Temperature),
            self.equipment_temperature_log_repository
                .find_latest_per_equipment(),
        )?;

        let mut latest: HashMap<i32, _> = latest
            .into_iter()
            .map(|log| (log.equipment_id, log))
            .collect();

        Ok(equipment
            .into_iter()
            .map(|equipment| {
                let equipment = EquipmentResponse::from(equipment);
                let latest_reading = latest
                    .remove(&equipment.id)
                    .map(EquipmentTemperatureLogResponse::from);
                let status = status_of(
                    &equipment.effective_profile(),
                    latest_reading.as_ref().map(|reading| reading.temperature),
                );

                EquipmentWithLatestReading {
                    equipment,
                    latest_reading,
                    status,
                }
            })
            .collect())
    }

    /// Equipment that takes inspections, with its newest one.
    pub async fn inspections(&self) -> Result<Vec<EquipmentWithLatestInspection>, ApiError> {
        let (equipment, latest) = tokio::try_join!(
            self.equipment_repository
                .find_accepting(EquipmentKind::Inspection),
            self.equipment_inspection_repository
                .find_latest_per_equipment(),
        )?;

        let mut latest: HashMap<i32, _> = latest
            .into_iter()
            .map(|inspection| (inspection.equipment_id, inspection))
            .collect();

        equipment
            .into_iter()
            .map(|equipment| -> Result<EquipmentWithLatestInspection, ApiError> {
                let latest_inspection = latest
                    .remove(&equipment.id)
                    .map(InspectionResponse::try_from)
                    .transpose()
                    .map_err(ApiError::IntegrityError)?;

                Ok(EquipmentWithLatestInspection {
                    equipment: equipment.into(),
                    latest_inspection,
                })
            })
            .collect()
    }

    pub async fn summary(&self) -> Result<DashboardSummary, ApiError> {
        let (rooms, equipment, inspections) =
            tokio::try_join!(self.rooms(), self.equipment(), self.inspections())?;

        Ok(summarize(&rooms, &equipment, &inspections))
    }
}

fn status_of(profile: &ThresholdProfile, temperature: Option<f64>) -> Status {
    temperature
        .map(|temperature| profile.classify(temperature))
        .unwrap_or_default()
}

pub fn summarize(
    rooms: &[RoomWithLatestReading],
    equipment: &[EquipmentWithLatestReading],
    inspections: &[EquipmentWithLatestInspection],
) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    let equipment_ids: HashSet<i32> = equipment
        .iter()
        .map(|item| item.equipment.id)
        .chain(inspections.iter().map(|item| item.equipment.id))
        .collect();
    summary.total_assets = (rooms.len() + equipment_ids.len()) as u32;

    let measured: Vec<(f64, Status)> = rooms
        .iter()
        .filter_map(|room| room.latest_reading.as_ref().map(|r| (r.temperature, room.status)))
        .chain(equipment.iter().filter_map(|item| {
            item.latest_reading
                .as_ref()
                .map(|r| (r.temperature, item.status))
        }))
        .collect();

    if !measured.is_empty() {
        let total: f64 = measured.iter().map(|(temperature, _)| temperature).sum();
        summary.average_temperature = Some(total / measured.len() as f64);
    }

    for (_, status) in &measured {
        match status {
            Status::Normal => summary.normal_count += 1,
            Status::Warning => summary.warning_count += 1,
            Status::Critical => summary.critical_count += 1,
        }
    }

    for item in inspections {
        match item.latest_inspection.as_ref().map(|i| i.condition) {
            Some(Condition::Bagus) => summary.inspection_good += 1,
            Some(Condition::TidakBagus) => summary.inspection_not_good += 1,
            None => {}
        }
    }

    summary.attention_count =
        summary.warning_count + summary.critical_count + summary.inspection_not_good;

    summary
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_rooms_classified_by_latest_reading() {
        let storage = setup_test_db().await;
        let lab = create_test_room(storage.clone(), "Lab Kimia", "RM-001").await;
        let cold = create_test_room(storage.clone(), "Cold Room", "RM-002").await;
        create_test_room(storage.clone(), "Gudang", "RM-003").await;
        create_test_temperature_log(storage.clone(), lab.id, None, 31.0, datetime!(2024-05-01 08:00 UTC)).await;
        create_test_temperature_log(storage.clone(), lab.id, None, 24.0, datetime!(2024-05-02 08:00 UTC)).await;
        create_test_temperature_log(storage.clone(), cold.id, None, 7.0, datetime!(2024-05-02 08:00 UTC)).await;

        let rooms = DashboardService::new(storage).rooms().await.unwrap();
        let status = |id: i32| rooms.iter().find(|r| r.room.id == id).unwrap().status;

        assert_eq!(status(lab.id), Status::Normal);
        assert_eq!(status(cold.id), Status::Warning);
        assert!(rooms.iter().any(|r| r.latest_reading.is_none()));
    }

    #[tokio::test]
    async fn test_summary_counts_inspections() {
        let storage = setup_test_db().await;
        let autoclave = create_test_equipment(storage.clone(), "Autoclave", "EQ-001", Some(EquipmentKind::Inspection)).await;
        let hood = create_test_equipment(storage.clone(), "Fume Hood", "EQ-002", Some(EquipmentKind::Inspection)).await;
        create_test_inspection(storage.clone(), autoclave.id, None, Condition::Bagus, datetime!(2024-05-01 08:00 UTC)).await;
        create_test_inspection(storage.clone(), hood.id, None, Condition::TidakBagus, datetime!(2024-05-01 08:00 UTC)).await;

        let summary = DashboardService::new(storage).summary().await.unwrap();

        assert_eq!(summary.total_assets, 2);
        assert_eq!(summary.inspection_good, 1);
        assert_eq!(summary.inspection_not_good, 1);
        assert_eq!(summary.attention_count, 1);
        assert_eq!(summary.average_temperature, None);
    }

    #[tokio::test]
    async fn test_unclassified_equipment_counted_once() {
        let storage = setup_test_db().await;
        let equipment = create_test_equipment(storage.clone(), "Inkubator", "EQ-001", None).await;
        create_test_equipment_temperature_log(storage.clone(), equipment.id, None, 40.0, datetime!(2024-05-01 08:00 UTC)).await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        create_test_temperature_log(storage.clone(), room.id, None, 22.0, datetime!(2024-05-01 08:00 UTC)).await;

        let summary = DashboardService::new(storage).summary().await.unwrap();

        assert_eq!(summary.total_assets, 2);
        assert_eq!(summary.critical_count, 1);
        assert_eq!(summary.normal_count, 1);
        assert_eq!(summary.average_temperature, Some(31.0));
    }
}
