use std::sync::Arc;

use labtrack_api::models::{
    ChangeEvent, ChangeKind, ChangeTable, CreateEquipmentRequest, CreateRoomRequest, EntityId,
    EquipmentKind, EquipmentResponse, RoomResponse, UpdateEquipmentRequest, UpdateRoomRequest,
};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::{ApiError, EntityError};
use crate::models::{Equipment, Room, encode_profile, stored_time};
use crate::repositories::{
    EquipmentInspectionRepository, EquipmentRepository, EquipmentTemperatureLogRepository,
    RoomRepository, TemperatureLogRepository,
};
use crate::services::ChangeFeed;

/// Registry of rooms and equipment.
#[derive(Clone)]
pub struct EntityService {
    room_repository: Arc<RoomRepository>,
    equipment_repository: Arc<EquipmentRepository>,
    temperature_log_repository: Arc<TemperatureLogRepository>,
    equipment_temperature_log_repository: Arc<EquipmentTemperatureLogRepository>,
    equipment_inspection_repository: Arc<EquipmentInspectionRepository>,
    change_feed: Arc<ChangeFeed>,
}

fn barcode_conflict(error: sqlx::Error, barcode: &str) -> ApiError {
    match error.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            EntityError::BarcodeExists(barcode.to_string()).into()
        }
        _ => error.into(),
    }
}

fn single_row(affected: u64, what: &str, missing: EntityError) -> Result<(), ApiError> {
    match affected {
        0 => Err(missing.into()),
        1 => Ok(()),
        n => Err(ApiError::IntegrityError(format!("{what} affected {n} rows"))),
    }
}

impl EntityService {
    pub fn new(storage: Arc<Storage>, change_feed: Arc<ChangeFeed>) -> Self {
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
            change_feed,
        }
    }

    fn publish(&self, table: ChangeTable, kind: ChangeKind, id: i32) {
        self.change_feed.publish(ChangeEvent {
            table,
            kind,
            id,
            entity_id: None,
        });
    }

    /// Barcodes are unique across rooms and equipment so a scan resolves to one asset.
    async fn ensure_barcode_free(&self, barcode: &str, owner: Option<EntityId>) -> Result<(), ApiError> {
        if let Some(room) = self.room_repository.find_by_barcode(barcode).await? {
            if owner != Some(EntityId::Room(room.id)) {
                return Err(EntityError::BarcodeExists(barcode.to_string()).into());
            }
        }

        if let Some(equipment) = self.equipment_repository.find_by_barcode(barcode).await? {
            if owner != Some(EntityId::Equipment(equipment.id)) {
                return Err(EntityError::BarcodeExists(barcode.to_string()).into());
            }
        }

        Ok(())
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomResponse>, ApiError> {
        let rooms = self.room_repository.find_all().await?;

        Ok(rooms.into_iter().map(RoomResponse::from).collect())
    }

    pub async fn get_room(&self, id: i32) -> Result<RoomResponse, ApiError> {
        let room = self
            .room_repository
            .find_by_id(id)
            .await?
            .ok_or(EntityError::RoomNotFound)?;

        Ok(room.into())
    }

    pub async fn room_by_code(&self, code: &str) -> Result<RoomResponse, ApiError> {
        let room = self
            .room_repository
            .find_by_barcode(code.trim())
            .await?
            .ok_or(EntityError::RoomNotFound)?;

        Ok(room.into())
    }

    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<RoomResponse, ApiError> {
        request.validate()?;

        let barcode = request.barcode.trim().to_string();
        self.ensure_barcode_free(&barcode, None).await?;

        let now = stored_time(OffsetDateTime::now_utc());
        let room = Room {
            id: 0,
            name: request.name.trim().to_string(),
            location: request.location.trim().to_string(),
            barcode: barcode.clone(),
            threshold_profile: encode_profile(request.threshold_profile),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.room_repository.get_pool().begin().await?;
        let id = self
            .room_repository
            .create(&room, &mut tx)
            .await
            .map_err(|e| barcode_conflict(e, &barcode))?;
        tx.commit().await?;

        let created = self
            .room_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::IntegrityError(format!("room {id} missing after insert")))?;

        self.publish(ChangeTable::Rooms, ChangeKind::Insert, id);

        Ok(created.into())
    }

    pub async fn update_room(
        &self,
        id: i32,
        request: UpdateRoomRequest,
    ) -> Result<RoomResponse, ApiError> {
        request.validate()?;

        let current = self
            .room_repository
            .find_by_id(id)
            .await?
            .ok_or(EntityError::RoomNotFound)?;

        let barcode = match &request.barcode {
            Some(barcode) => barcode.trim().to_string(),
            None => current.barcode.clone(),
        };
        if barcode != current.barcode {
            self.ensure_barcode_free(&barcode, Some(EntityId::Room(id))).await?;
        }

        let room = Room {
            name: request
                .name
                .map(|name| name.trim().to_string())
                .unwrap_or(current.name),
            location: request
                .location
                .map(|location| location.trim().to_string())
                .unwrap_or(current.location),
            barcode: barcode.clone(),
            threshold_profile: request
                .threshold_profile
                .map_or(current.threshold_profile, |p| encode_profile(Some(p))),
            updated_at: stored_time(OffsetDateTime::now_utc()),
            ..current
        };

        let mut tx = self.room_repository.get_pool().begin().await?;
        let affected = self
            .room_repository
            .update(id, &room, &mut tx)
            .await
            .map_err(|e| barcode_conflict(e, &barcode))?;
        single_row(affected, "room update", EntityError::RoomNotFound)?;
        tx.commit().await?;

        self.publish(ChangeTable::Rooms, ChangeKind::Update, id);

        self.get_room(id).await
    }

    /// Removes the room together with its readings, or nothing at all.
    pub async fn delete_room(&self, id: i32) -> Result<(), ApiError> {
        let mut tx = self.room_repository.get_pool().begin().await?;

        let readings = self
            .temperature_log_repository
            .delete_by_room(id, &mut tx)
            .await?;
        let affected = self.room_repository.delete(id, &mut tx).await?;
        single_row(affected, "room delete", EntityError::RoomNotFound)?;

        tx.commit().await?;

        tracing::info!("deleted room {id} with {readings} readings");
        self.publish(ChangeTable::Rooms, ChangeKind::Delete, id);

        Ok(())
    }

    pub async fn list_equipment(
        &self,
        kind: Option<EquipmentKind>,
    ) -> Result<Vec<EquipmentResponse>, ApiError> {
        let equipment = match kind {
            Some(kind) => self.equipment_repository.find_accepting(kind).await?,
            None => self.equipment_repository.find_all().await?,
        };

        Ok(equipment.into_iter().map(EquipmentResponse::from).collect())
    }

    pub async fn get_equipment(&self, id: i32) -> Result<EquipmentResponse, ApiError> {
        let equipment = self
            .equipment_repository
            .find_by_id(id)
            .await?
            .ok_or(EntityError::EquipmentNotFound)?;

        Ok(equipment.into())
    }

    pub async fn equipment_by_code(&self, code: &str) -> Result<EquipmentResponse, ApiError> {
        let equipment = self
            .equipment_repository
            .find_by_barcode(code.trim())
            .await?
            .ok_or(EntityError::EquipmentNotFound)?;

        Ok(equipment.into())
    }

    pub async fn create_equipment(
        &self,
        request: CreateEquipmentRequest,
    ) -> Result<EquipmentResponse, ApiError> {
        request.validate()?;

        let barcode = request.barcode.trim().to_string();
        self.ensure_barcode_free(&barcode, None).await?;

        let now = stored_time(OffsetDateTime::now_utc());
        let equipment = Equipment {
            id: 0,
            name: request.name.trim().to_string(),
            location: request.location.trim().to_string(),
            barcode: barcode.clone(),
            kind: request.kind.map(|kind| kind.as_str().to_string()),
            threshold_profile: encode_profile(request.threshold_profile),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.equipment_repository.get_pool().begin().await?;
        let id = self
            .equipment_repository
            .create(&equipment, &mut tx)
            .await
            .map_err(|e| barcode_conflict(e, &barcode))?;
        tx.commit().await?;

        let created = self
            .equipment_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                ApiError::IntegrityError(format!("equipment {id} missing after insert"))
            })?;

        self.publish(ChangeTable::Equipment, ChangeKind::Insert, id);

        Ok(created.into())
    }

    pub async fn update_equipment(
        &self,
        id: i32,
        request: UpdateEquipmentRequest,
    ) -> Result<EquipmentResponse, ApiError> {
        request.validate()?;

        let current = self
            .equipment_repository
            .find_by_id(id)
            .await?
            .ok_or(EntityError::EquipmentNotFound)?;

        let barcode = match &request.barcode {
            Some(barcode) => barcode.trim().to_string(),
            None => current.barcode.clone(),
        };
        if barcode != current.barcode {
            self.ensure_barcode_free(&barcode, Some(EntityId::Equipment(id)))
                .await?;
        }

        let equipment = Equipment {
            name: request
                .name
                .map(|name| name.trim().to_string())
                .unwrap_or(current.name),
            location: request
                .location
                .map(|location| location.trim().to_string())
                .unwrap_or(current.location),
            barcode: barcode.clone(),
            kind: request
                .kind
                .map_or(current.kind, |kind| Some(kind.as_str().to_string())),
            threshold_profile: request
                .threshold_profile
                .map_or(current.threshold_profile, |p| encode_profile(Some(p))),
            updated_at: stored_time(OffsetDateTime::now_utc()),
            ..current
        };

        let mut tx = self.equipment_repository.get_pool().begin().await?;
        let affected = self
            .equipment_repository
            .update(id, &equipment, &mut tx)
            .await
            .map_err(|e| barcode_conflict(e, &barcode))?;
        single_row(affected, "equipment update", EntityError::EquipmentNotFound)?;
        tx.commit().await?;

        self.publish(ChangeTable::Equipment, ChangeKind::Update, id);

        self.get_equipment(id).await
    }

    /// Removes the equipment together with its readings and inspections, or nothing at all.
    pub async fn delete_equipment(&self, id: i32) -> Result<(), ApiError> {
        let mut tx = self.equipment_repository.get_pool().begin().await?;

        let readings = self
            .equipment_temperature_log_repository
            .delete_by_equipment(id, &mut tx)
            .await?;
        let inspections = self
            .equipment_inspection_repository
            .delete_by_equipment(id, &mut tx)
            .await?;
        let affected = self.equipment_repository.delete(id, &mut tx).await?;
        single_row(affected, "equipment delete", EntityError::EquipmentNotFound)?;

        tx.commit().await?;

        tracing::info!("deleted equipment {id} with {readings} readings and {inspections} inspections");
        self.publish(ChangeTable::Equipment, ChangeKind::Delete, id);

        Ok(())
    }
}
