use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use labtrack_api::models::*;

use crate::backend::Backend;
use crate::error::Result;

/// Last known record shown on an entity's card.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedReading {
    Room(TemperatureLogResponse),
    Equipment(EquipmentTemperatureLogResponse),
    Inspection(InspectionResponse),
}

impl CachedReading {
    pub fn entity_id(&self) -> EntityId {
        match self {
            CachedReading::Room(reading) => EntityId::Room(reading.room_id),
            CachedReading::Equipment(reading) => EntityId::Equipment(reading.equipment_id),
            CachedReading::Inspection(inspection) => EntityId::Equipment(inspection.equipment_id),
        }
    }

    pub fn kind(&self) -> EquipmentKind {
        match self {
            CachedReading::Room(_) | CachedReading::Equipment(_) => EquipmentKind::Temperature,
            CachedReading::Inspection(_) => EquipmentKind::Inspection,
        }
    }
}

type Entries = HashMap<(EntityId, EquipmentKind), CachedReading>;

/// Latest-reading projections keyed by entity and reading kind. Entries are dropped or
/// refetched, never patched locally, so a card always shows a record the server returned.
#[derive(Debug, Default)]
pub struct LatestReadingCache {
    entries: Mutex<Entries>,
}

impl LatestReadingCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, entity: EntityId, kind: EquipmentKind) -> Option<CachedReading> {
        self.lock().get(&(entity, kind)).cloned()
    }

    pub fn put(&self, reading: CachedReading) {
        self.lock().insert((reading.entity_id(), reading.kind()), reading);
    }

    /// Drops every entry of `entity`. Returns whether anything was cached.
    pub fn invalidate(&self, entity: EntityId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(cached, _), _| *cached != entity);
        entries.len() != before
    }

    /// Replaces the whole cache with the server's dashboard projections.
    pub async fn refresh<B: Backend + ?Sized>(&self, backend: &B) -> Result<usize> {
        let rooms = backend.room_cards().await?;
        let equipment = backend.equipment_cards().await?;
        let inspections = backend.inspection_cards().await?;

        let latest = rooms
            .into_iter()
            .filter_map(|card| card.latest_reading.map(CachedReading::Room))
            .chain(
                equipment
                    .into_iter()
                    .filter_map(|card| card.latest_reading.map(CachedReading::Equipment)),
            )
            .chain(
                inspections
                    .into_iter()
                    .filter_map(|card| card.latest_inspection.map(CachedReading::Inspection)),
            );

        let mut entries = Entries::new();
        for reading in latest {
            entries.insert((reading.entity_id(), reading.kind()), reading);
        }

        let count = entries.len();
        *self.lock() = entries;
        log::debug!("latest readings refreshed, {count} cached");
        Ok(count)
    }

    /// Drops whatever a pushed change notification may have made stale.
    pub fn apply(&self, event: &ChangeEvent) {
        let entity = match (event.table, event.entity_id) {
            (ChangeTable::TemperatureLogs, Some(id)) => EntityId::Room(id),
            (ChangeTable::EquipmentTemperatureLogs | ChangeTable::EquipmentInspections, Some(id)) => {
                EntityId::Equipment(id)
            }
            (ChangeTable::Rooms, _) if event.kind == ChangeKind::Delete => EntityId::Room(event.id),
            (ChangeTable::Equipment, _) if event.kind == ChangeKind::Delete => {
                EntityId::Equipment(event.id)
            }
            (ChangeTable::Rooms | ChangeTable::Equipment, _) => return,
            (_, None) => {
                log::debug!("{} change without owner, clearing cache", event.table);
                self.clear();
                return;
            }
        };

        self.invalidate(entity);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
