use std::sync::Arc;

use labtrack_api::models::{
    ChangeEvent, ChangeKind, ChangeTable, CreateInspectionRequest,
    CreateTemperatureReadingRequest, EquipmentKind, EquipmentTemperatureLogResponse,
    InspectionResponse, ReadingFilter, TemperatureLogResponse, UpdateInspectionRequest,
    UpdateTemperatureReadingRequest,
};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::{ApiError, EntityError, ReadingError};
use crate::models::{
    Equipment, EquipmentInspection, EquipmentTemperatureLog, TemperatureLog, stored_time,
};
use crate::repositories::{
    EquipmentInspectionRepository, EquipmentRepository, EquipmentTemperatureLogRepository,
    RecordRange, RoomRepository, TemperatureLogRepository,
};
use crate::services::{ChangeFeed, PermissionService};

/// Most rows a listing returns.
pub const LISTING_LIMIT: u32 = 500;

/// Records temperature readings and inspections on behalf of a signed-in user.
#[derive(Clone)]
pub struct ReadingService {
    room_repository: Arc<RoomRepository>,
    equipment_repository: Arc<EquipmentRepository>,
    temperature_log_repository: Arc<TemperatureLogRepository>,
    equipment_temperature_log_repository: Arc<EquipmentTemperatureLogRepository>,
    equipment_inspection_repository: Arc<EquipmentInspectionRepository>,
    permission_service: Arc<PermissionService>,
    change_feed: Arc<ChangeFeed>,
}

fn single_row(affected: u64, what: &str, missing: ReadingError) -> Result<(), ApiError> {
    match affected {
        0 => Err(missing.into()),
        1 => Ok(()),
        n => Err(ApiError::IntegrityError(format!("{what} affected {n} rows"))),
    }
}

fn range_of(filter: &ReadingFilter) -> RecordRange {
    RecordRange {
        from: filter.from.map(stored_time),
        to: filter.to.map(stored_time),
        limit: LISTING_LIMIT,
    }
}

fn inspection_response(inspection: EquipmentInspection) -> Result<InspectionResponse, ApiError> {
    InspectionResponse::try_from(inspection).map_err(ApiError::IntegrityError)
}

impl ReadingService {
    pub fn new(
        storage: Arc<Storage>,
        permission_service: Arc<PermissionService>,
        change_feed: Arc<ChangeFeed>,
    ) -> Self {
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
            permission_service,
            change_feed,
        }
    }

    fn publish(&self, table: ChangeTable, kind: ChangeKind, id: i32, entity_id: i32) {
        self.change_feed.publish(ChangeEvent {
            table,
            kind,
            id,
            entity_id: Some(entity_id),
        });
    }

    async fn equipment_accepting(
        &self,
        equipment_id: i32,
        kind: EquipmentKind,
    ) -> Result<Equipment, ApiError> {
        let equipment = self
            .equipment_repository
            .find_by_id(equipment_id)
            .await?
            .ok_or(EntityError::EquipmentNotFound)?;

        if equipment.kind().is_some_and(|own| own != kind) {
            return Err(ReadingError::KindMismatch {
                equipment: equipment.name,
                kind,
            }
            .into());
        }

        Ok(equipment)
    }

    pub async fn submit_room_reading(
        &self,
        user_id: i32,
        room_id: i32,
        request: CreateTemperatureReadingRequest,
    ) -> Result<TemperatureLogResponse, ApiError> {
        self.permission_service.require_user(user_id).await?;
        request.validate(true)?;

        self.room_repository
            .find_by_id(room_id)
            .await?
            .ok_or(EntityError::RoomNotFound)?;

        let log = TemperatureLog {
            id: 0,
            room_id,
            temperature: request.temperature,
            humidity: request.humidity,
            recorded_by: Some(user_id),
            recorded_at: stored_time(request.recorded_at.unwrap_or_else(OffsetDateTime::now_utc)),
            room_name: None,
        };

        let mut tx = self.temperature_log_repository.get_pool().begin().await?;
        let id = self.temperature_log_repository.create(&log, &mut tx).await?;
        tx.commit().await?;

        let created = self
            .temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::IntegrityError(format!("reading {id} missing after insert")))?;

        tracing::info!("user {user_id} recorded {} °C in room {room_id}", log.temperature);
        self.publish(ChangeTable::TemperatureLogs, ChangeKind::Insert, id, room_id);

        Ok(created.into())
    }

    pub async fn submit_equipment_reading(
        &self,
        user_id: i32,
        equipment_id: i32,
        request: CreateTemperatureReadingRequest,
    ) -> Result<EquipmentTemperatureLogResponse, ApiError> {
        self.permission_service.require_user(user_id).await?;
        request.validate(false)?;

        self.equipment_accepting(equipment_id, EquipmentKind::Temperature)
            .await?;

        let log = EquipmentTemperatureLog {
            id: 0,
            equipment_id,
            temperature: request.temperature,
            recorded_by: Some(user_id),
            recorded_at: stored_time(request.recorded_at.unwrap_or_else(OffsetDateTime::now_utc)),
            equipment_name: None,
        };

        let mut tx = self
            .equipment_temperature_log_repository
            .get_pool()
            .begin()
            .await?;
        let id = self
            .equipment_temperature_log_repository
            .create(&log, &mut tx)
            .await?;
        tx.commit().await?;

        let created = self
            .equipment_temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::IntegrityError(format!("reading {id} missing after insert")))?;

        tracing::info!(
            "user {user_id} recorded {} °C on equipment {equipment_id}",
            log.temperature
        );
        self.publish(
            ChangeTable::EquipmentTemperatureLogs,
            ChangeKind::Insert,
            id,
            equipment_id,
        );

        Ok(created.into())
    }

    pub async fn submit_inspection(
        &self,
        user_id: i32,
        equipment_id: i32,
        request: CreateInspectionRequest,
    ) -> Result<InspectionResponse, ApiError> {
        self.permission_service.require_user(user_id).await?;
        request.validate()?;

        self.equipment_accepting(equipment_id, EquipmentKind::Inspection)
            .await?;

        let inspection = EquipmentInspection {
            id: 0,
            equipment_id,
            condition: request.condition.as_str().to_string(),
            notes: request
                .notes
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
            inspected_by: Some(user_id),
            inspected_at: stored_time(request.inspected_at.unwrap_or_else(OffsetDateTime::now_utc)),
            equipment_name: None,
        };

        let mut tx = self
            .equipment_inspection_repository
            .get_pool()
            .begin()
            .await?;
        let id = self
            .equipment_inspection_repository
            .create(&inspection, &mut tx)
            .await?;
        tx.commit().await?;

        let created = self
            .equipment_inspection_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                ApiError::IntegrityError(format!("inspection {id} missing after insert"))
            })?;

        tracing::info!(
            "user {user_id} inspected equipment {equipment_id}: {}",
            inspection.condition
        );
        self.publish(
            ChangeTable::EquipmentInspections,
            ChangeKind::Insert,
            id,
            equipment_id,
        );

        inspection_response(created)
    }

    pub async fn list_room_readings(
        &self,
        filter: &ReadingFilter,
    ) -> Result<Vec<TemperatureLogResponse>, ApiError> {
        let logs = self
            .temperature_log_repository
            .find_by_room(filter.room_id, range_of(filter))
            .await?;

        Ok(logs.into_iter().map(TemperatureLogResponse::from).collect())
    }

    pub async fn list_equipment_readings(
        &self,
        filter: &ReadingFilter,
    ) -> Result<Vec<EquipmentTemperatureLogResponse>, ApiError> {
        let logs = self
            .equipment_temperature_log_repository
            .find_by_equipment(filter.equipment_id, range_of(filter))
            .await?;

        Ok(logs
            .into_iter()
            .map(EquipmentTemperatureLogResponse::from)
            .collect())
    }

    pub async fn list_inspections(
        &self,
        filter: &ReadingFilter,
    ) -> Result<Vec<InspectionResponse>, ApiError> {
        let inspections = self
            .equipment_inspection_repository
            .find_by_equipment(filter.equipment_id, range_of(filter))
            .await?;

        inspections.into_iter().map(inspection_response).collect()
    }

    pub async fn update_room_reading(
        &self,
        id: i32,
        request: UpdateTemperatureReadingRequest,
    ) -> Result<TemperatureLogResponse, ApiError> {
        request.validate(true)?;

        let current = self
            .temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::ReadingNotFound)?;

        let log = TemperatureLog {
            temperature: request.temperature.unwrap_or(current.temperature),
            humidity: request.humidity.or(current.humidity),
            recorded_at: request
                .recorded_at
                .map_or(current.recorded_at, stored_time),
            ..current
        };

        let mut tx = self.temperature_log_repository.get_pool().begin().await?;
        let affected = self
            .temperature_log_repository
            .update(id, &log, &mut tx)
            .await?;
        single_row(affected, "reading update", ReadingError::ReadingNotFound)?;
        tx.commit().await?;

        self.publish(ChangeTable::TemperatureLogs, ChangeKind::Update, id, log.room_id);

        let updated = self
            .temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::ReadingNotFound)?;

        Ok(updated.into())
    }

    pub async fn update_equipment_reading(
        &self,
        id: i32,
        request: UpdateTemperatureReadingRequest,
    ) -> Result<EquipmentTemperatureLogResponse, ApiError> {
        request.validate(false)?;

        let current = self
            .equipment_temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::ReadingNotFound)?;

        let log = EquipmentTemperatureLog {
            temperature: request.temperature.unwrap_or(current.temperature),
            recorded_at: request
                .recorded_at
                .map_or(current.recorded_at, stored_time),
            ..current
        };

        let mut tx = self
            .equipment_temperature_log_repository
            .get_pool()
            .begin()
            .await?;
        let affected = self
            .equipment_temperature_log_repository
            .update(id, &log, &mut tx)
            .await?;
        single_row(affected, "reading update", ReadingError::ReadingNotFound)?;
        tx.commit().await?;

        self.publish(
            ChangeTable::EquipmentTemperatureLogs,
            ChangeKind::Update,
            id,
            log.equipment_id,
        );

        let updated = self
            .equipment_temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::ReadingNotFound)?;

        Ok(updated.into())
    }

    pub async fn update_inspection(
        &self,
        id: i32,
        request: UpdateInspectionRequest,
    ) -> Result<InspectionResponse, ApiError> {
        request.validate()?;

        let current = self
            .equipment_inspection_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::InspectionNotFound)?;

        let inspection = EquipmentInspection {
            condition: request
                .condition
                .map_or(current.condition, |condition| condition.as_str().to_string()),
            notes: match request.notes {
                Some(notes) if notes.trim().is_empty() => None,
                Some(notes) => Some(notes.trim().to_string()),
                None => current.notes,
            },
            inspected_at: request
                .inspected_at
                .map_or(current.inspected_at, stored_time),
            ..current
        };

        let mut tx = self
            .equipment_inspection_repository
            .get_pool()
            .begin()
            .await?;
        let affected = self
            .equipment_inspection_repository
            .update(id, &inspection, &mut tx)
            .await?;
        single_row(affected, "inspection update", ReadingError::InspectionNotFound)?;
        tx.commit().await?;

        self.publish(
            ChangeTable::EquipmentInspections,
            ChangeKind::Update,
            id,
            inspection.equipment_id,
        );

        let updated = self
            .equipment_inspection_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::InspectionNotFound)?;

        inspection_response(updated)
    }

    pub async fn delete_room_reading(&self, id: i32) -> Result<(), ApiError> {
        let current = self
            .temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::ReadingNotFound)?;

        let mut tx = self.temperature_log_repository.get_pool().begin().await?;
        let affected = self.temperature_log_repository.delete(id, &mut tx).await?;
        single_row(affected, "reading delete", ReadingError::ReadingNotFound)?;
        tx.commit().await?;

        self.publish(ChangeTable::TemperatureLogs, ChangeKind::Delete, id, current.room_id);

        Ok(())
    }

    pub async fn delete_equipment_reading(&self, id: i32) -> Result<(), ApiError> {
        let current = self
            .equipment_temperature_log_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::ReadingNotFound)?;

        let mut tx = self
            .equipment_temperature_log_repository
            .get_pool()
            .begin()
            .await?;
        let affected = self
            .equipment_temperature_log_repository
            .delete(id, &mut tx)
            .await?;
        single_row(affected, "reading delete", ReadingError::ReadingNotFound)?;
        tx.commit().await?;

        self.publish(
            ChangeTable::EquipmentTemperatureLogs,
            ChangeKind::Delete,
            id,
            current.equipment_id,
        );

        Ok(())
    }

    pub async fn delete_inspection(&self, id: i32) -> Result<(), ApiError> {
        let current = self
            .equipment_inspection_repository
            .find_by_id(id)
            .await?
            .ok_or(ReadingError::InspectionNotFound)?;

        let mut tx = self
            .equipment_inspection_repository
            .get_pool()
            .begin()
            .await?;
        let affected = self
            .equipment_inspection_repository
            .delete(id, &mut tx)
            .await?;
        single_row(affected, "inspection delete", ReadingError::InspectionNotFound)?;
        tx.commit().await?;

        self.publish(
            ChangeTable::EquipmentInspections,
            ChangeKind::Delete,
            id,
            current.equipment_id,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use labtrack_api::models::Condition;
    use time::macros::datetime;

    use crate::tests::*;

    use super::*;

    fn service(storage: Arc<Storage>) -> ReadingService {
        ReadingService::new(
            storage.clone(),
            Arc::new(PermissionService::new(storage)),
            Arc::new(ChangeFeed::new(16)),
        )
    }

    fn reading(temperature: f64, humidity: Option<f64>) -> CreateTemperatureReadingRequest {
        CreateTemperatureReadingRequest {
            temperature,
            humidity,
            recorded_at: None,
        }
    }

    #[tokio::test]
    async fn test_room_reading_keeps_manual_timestamp() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        let service = service(storage);

        let recorded_at = datetime!(2024-05-01 15:30:45 +07:00);
        let created = service
            .submit_room_reading(
                user.id,
                room.id,
                CreateTemperatureReadingRequest {
                    recorded_at: Some(recorded_at),
                    ..reading(22.4, Some(55.0))
                },
            )
            .await
            .unwrap();

        assert_eq!(created.recorded_at, recorded_at);
        assert_eq!(created.recorded_by, Some(user.id));
        assert_eq!(created.humidity, Some(55.0));
        assert_eq!(created.room_name.as_deref(), Some("Lab A"));
    }

    #[tokio::test]
    async fn test_fractional_manual_timestamp_is_rejected() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        let service = service(storage.clone());

        let result = service
            .submit_room_reading(
                user.id,
                room.id,
                CreateTemperatureReadingRequest {
                    recorded_at: Some(datetime!(2024-05-01 10:30:15.250 UTC)),
                    ..reading(22.4, None)
                },
            )
            .await;

        match result {
            Err(ApiError::ValidationError(fields)) => assert_eq!(fields[0].field, "recorded_at"),
            other => panic!("unexpected {other:?}"),
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM temperature_logs")
            .fetch_one(storage.get_pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_reading_is_not_stored() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        let service = service(storage.clone());

        let result = service
            .submit_room_reading(user.id, room.id, reading(150.0, None))
            .await;

        assert!(matches!(result, Err(ApiError::ValidationError(_))));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM temperature_logs")
            .fetch_one(storage.get_pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_cannot_record() {
        let storage = setup_test_db().await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        let service = service(storage);

        let result = service
            .submit_room_reading(999, room.id, reading(22.0, None))
            .await;

        assert!(matches!(
            result,
            Err(ApiError::AuthError(crate::errors::AuthError::Unauthenticated))
        ));
    }

    #[tokio::test]
    async fn test_equipment_reading_rejects_humidity() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let freezer = create_test_equipment(storage.clone(), "Freezer", "EQ-001", Some(EquipmentKind::Temperature)).await;
        let service = service(storage);

        let result = service
            .submit_equipment_reading(user.id, freezer.id, reading(-20.0, Some(40.0)))
            .await;

        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_inspection_on_temperature_equipment_is_rejected() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let freezer = create_test_equipment(storage.clone(), "Freezer", "EQ-001", Some(EquipmentKind::Temperature)).await;
        let service = service(storage);

        let result = service
            .submit_inspection(
                user.id,
                freezer.id,
                CreateInspectionRequest {
                    condition: Condition::Bagus,
                    notes: None,
                    inspected_at: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(ApiError::ReadingError(ReadingError::KindMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unclassified_equipment_takes_both_kinds() {
        let storage = setup_test_db().await;
        let user = create_test_user(storage.clone(), "tech@lab.org", false).await;
        let equipment = create_test_equipment(storage.clone(), "Inkubator", "EQ-001", None).await;
        let service = service(storage);

        service
            .submit_equipment_reading(user.id, equipment.id, reading(37.0, None))
            .await
            .unwrap();
        let inspection = service
            .submit_inspection(
                user.id,
                equipment.id,
                CreateInspectionRequest {
                    condition: Condition::TidakBagus,
                    notes: Some(String::from("  door seal torn ")),
                    inspected_at: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(inspection.condition, Condition::TidakBagus);
        assert_eq!(inspection.notes.as_deref(), Some("door seal torn"));
    }

    #[tokio::test]
    async fn test_delete_reading_requires_exactly_one_row() {
        let storage = setup_test_db().await;
        let room = create_test_room(storage.clone(), "Lab A", "RM-001").await;
        let log = create_test_temperature_log(storage.clone(), room.id, None, 21.0, datetime!(2024-05-01 08:00 UTC)).await;
        let service = service(storage);

        service.delete_room_reading(log.id).await.unwrap();

        assert!(matches!(
            service.delete_room_reading(log.id).await,
            Err(ApiError::ReadingError(ReadingError::ReadingNotFound))
        ));
    }

    #[tokio::test]
    async fn test_update_inspection_clears_blank_notes() {
        let storage = setup_test_db().await;
        let equipment = create_test_equipment(storage.clone(), "Autoclave", "EQ-001", None).await;
        let inspection = create_test_inspection(storage.clone(), equipment.id, None, Condition::Bagus, datetime!(2024-05-01 08:00 UTC)).await;
        let service = service(storage);

        let updated = service
            .update_inspection(
                inspection.id,
                UpdateInspectionRequest {
                    condition: Some(Condition::TidakBagus),
                    notes: Some(String::from(" ")),
                    inspected_at: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.condition, Condition::TidakBagus);
        assert_eq!(updated.notes, None);
        assert_eq!(updated.inspected_at, datetime!(2024-05-01 08:00 UTC));
    }
}
