use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use labtrack_api::Status;
use labtrack_api::models::*;
use time::OffsetDateTime;

use crate::backend::Backend;
use crate::error::{ClientError, Result};

pub(crate) fn room(id: i32, name: &str, barcode: &str) -> RoomResponse {
    RoomResponse {
        id,
        name: name.to_string(),
        location: String::from("Gedung A"),
        barcode: barcode.to_string(),
        threshold_profile: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub(crate) fn equipment(
    id: i32,
    name: &str,
    barcode: &str,
    kind: Option<EquipmentKind>,
) -> EquipmentResponse {
    EquipmentResponse {
        id,
        name: name.to_string(),
        location: String::from("Gedung A"),
        barcode: barcode.to_string(),
        kind,
        threshold_profile: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub(crate) fn room_reading(id: i32, room_id: i32, temperature: f64) -> TemperatureLogResponse {
    TemperatureLogResponse {
        id,
        room_id,
        room_name: None,
        temperature,
        humidity: None,
        recorded_by: Some(1),
        recorded_at: OffsetDateTime::UNIX_EPOCH,
    }
}

pub(crate) fn inspection(id: i32, equipment_id: i32) -> InspectionResponse {
    InspectionResponse {
        id,
        equipment_id,
        equipment_name: None,
        condition: Condition::Bagus,
        notes: None,
        inspected_by: Some(1),
        inspected_at: OffsetDateTime::UNIX_EPOCH,
    }
}

/// In-memory [`Backend`] with call counters and switchable failures.
#[derive(Default)]
pub(crate) struct FakeBackend {
    rooms: Mutex<Vec<RoomResponse>>,
    equipment: Mutex<Vec<EquipmentResponse>>,
    room_readings: Mutex<Vec<TemperatureLogResponse>>,
    equipment_readings: Mutex<Vec<EquipmentTemperatureLogResponse>>,
    inspections: Mutex<Vec<InspectionResponse>>,
    delay: Mutex<Option<Duration>>,
    lookups: AtomicUsize,
    submissions: AtomicUsize,
    fail_lookups: AtomicBool,
    fail_submissions: AtomicBool,
    next_id: AtomicI32,
}

impl FakeBackend {
    pub(crate) fn add_room(&self, room: RoomResponse) {
        self.rooms.lock().unwrap().push(room);
    }

    pub(crate) fn add_equipment(&self, equipment: EquipmentResponse) {
        self.equipment.lock().unwrap().push(equipment);
    }

    pub(crate) fn record_room_reading(&self, reading: TemperatureLogResponse) {
        self.room_readings.lock().unwrap().push(reading);
    }

    pub(crate) fn record_inspection(&self, inspection: InspectionResponse) {
        self.inspections.lock().unwrap().push(inspection);
    }

    /// Every lookup and submission sleeps this long before answering.
    pub(crate) fn delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn lookup(&self) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(ClientError::Transient(String::from("connection reset")));
        }
        Ok(())
    }

    fn dashboard(&self) -> Result<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(ClientError::Transient(String::from("connection reset")));
        }
        Ok(())
    }

    async fn submission(&self) -> Result<i32> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(ClientError::Transient(String::from("gateway timeout")));
        }
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_rooms(&self) -> Result<Vec<RoomResponse>> {
        Ok(self.rooms.lock().unwrap().clone())
    }

    async fn list_equipment(&self) -> Result<Vec<EquipmentResponse>> {
        Ok(self.equipment.lock().unwrap().clone())
    }

    async fn room_by_code(&self, code: &str) -> Result<Option<RoomResponse>> {
        self.lookup().await?;
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms.iter().find(|room| room.barcode == code).cloned())
    }

    async fn equipment_by_code(&self, code: &str) -> Result<Option<EquipmentResponse>> {
        self.lookup().await?;
        let equipment = self.equipment.lock().unwrap();
        Ok(equipment.iter().find(|item| item.barcode == code).cloned())
    }

    async fn submit_room_reading(
        &self,
        room_id: i32,
        request: &CreateTemperatureReadingRequest,
    ) -> Result<TemperatureLogResponse> {
        let id = self.submission().await?;
        let reading = TemperatureLogResponse {
            humidity: request.humidity,
            recorded_at: request.recorded_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
            ..room_reading(id, room_id, request.temperature)
        };
        self.record_room_reading(reading.clone());
        Ok(reading)
    }

    async fn submit_equipment_reading(
        &self,
        equipment_id: i32,
        request: &CreateTemperatureReadingRequest,
    ) -> Result<EquipmentTemperatureLogResponse> {
        let id = self.submission().await?;
        let reading = EquipmentTemperatureLogResponse {
            id,
            equipment_id,
            equipment_name: None,
            temperature: request.temperature,
            recorded_by: Some(1),
            recorded_at: request.recorded_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
        };
        self.equipment_readings.lock().unwrap().push(reading.clone());
        Ok(reading)
    }

    async fn submit_inspection(
        &self,
        equipment_id: i32,
        request: &CreateInspectionRequest,
    ) -> Result<InspectionResponse> {
        let id = self.submission().await?;
        let inspection = InspectionResponse {
            condition: request.condition,
            notes: request.notes.clone(),
            inspected_at: request.inspected_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
            ..inspection(id, equipment_id)
        };
        self.record_inspection(inspection.clone());
        Ok(inspection)
    }

    async fn room_cards(&self) -> Result<Vec<RoomWithLatestReading>> {
        self.dashboard()?;
        let readings = self.room_readings.lock().unwrap();
        let rooms = self.rooms.lock().unwrap();

        Ok(rooms
            .iter()
            .map(|room| RoomWithLatestReading {
                room: room.clone(),
                latest_reading: readings
                    .iter()
                    .filter(|reading| reading.room_id == room.id)
                    .max_by_key(|reading| reading.id)
                    .cloned(),
                status: Status::Normal,
            })
            .collect())
    }

    async fn equipment_cards(&self) -> Result<Vec<EquipmentWithLatestReading>> {
        self.dashboard()?;
        let readings = self.equipment_readings.lock().unwrap();
        let equipment = self.equipment.lock().unwrap();

        Ok(equipment
            .iter()
            .filter(|item| item.accepts(EquipmentKind::Temperature))
            .map(|item| EquipmentWithLatestReading {
                equipment: item.clone(),
                latest_reading: readings
                    .iter()
                    .filter(|reading| reading.equipment_id == item.id)
                    .max_by_key(|reading| reading.id)
                    .cloned(),
                status: Status::Normal,
            })
            .collect())
    }

    async fn inspection_cards(&self) -> Result<Vec<EquipmentWithLatestInspection>> {
        self.dashboard()?;
        let inspections = self.inspections.lock().unwrap();
        let equipment = self.equipment.lock().unwrap();

        Ok(equipment
            .iter()
            .filter(|item| item.accepts(EquipmentKind::Inspection))
            .map(|item| EquipmentWithLatestInspection {
                equipment: item.clone(),
                latest_inspection: inspections
                    .iter()
                    .filter(|inspection| inspection.equipment_id == item.id)
                    .max_by_key(|inspection| inspection.id)
                    .cloned(),
            })
            .collect())
    }
}
