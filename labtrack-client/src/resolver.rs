use labtrack_api::DeepLink;
use labtrack_api::models::*;

use crate::backend::Backend;
use crate::error::{ClientError, Result};

/// Turns scanned payloads and manual picks into rooms or equipment.
///
/// Lookup order is the loaded lists by exact code, then a deep link id against the
/// loaded lists, then the server by code. Rooms are tried before equipment at every
/// step, so a code shared by both resolves to the room.
#[derive(Debug, Default, Clone)]
pub struct IdentifierResolver {
    rooms: Vec<RoomResponse>,
    equipment: Vec<EquipmentResponse>,
}

impl IdentifierResolver {
    pub fn new(rooms: Vec<RoomResponse>, equipment: Vec<EquipmentResponse>) -> Self {
        Self { rooms, equipment }
    }

    pub async fn load<B: Backend + ?Sized>(backend: &B) -> Result<Self> {
        let rooms = backend.list_rooms().await?;
        let equipment = backend.list_equipment().await?;
        log::debug!("loaded {} rooms and {} equipment", rooms.len(), equipment.len());

        Ok(Self::new(rooms, equipment))
    }

    pub fn rooms(&self) -> &[RoomResponse] {
        &self.rooms
    }

    pub fn equipment(&self) -> &[EquipmentResponse] {
        &self.equipment
    }

    /// Entity picked from a list, bypassing decoding.
    pub fn select(&self, id: EntityId) -> Option<ResolvedEntity> {
        match id {
            EntityId::Room(id) => self
                .rooms
                .iter()
                .find(|room| room.id == id)
                .cloned()
                .map(ResolvedEntity::Room),
            EntityId::Equipment(id) => self
                .equipment
                .iter()
                .find(|equipment| equipment.id == id)
                .cloned()
                .map(ResolvedEntity::Equipment),
        }
    }

    /// Resolves without a network round trip when the loaded lists suffice.
    pub fn resolve_local(&self, code: &str) -> Option<ResolvedEntity> {
        if let Some(room) = self.rooms.iter().find(|room| room.barcode == code) {
            return Some(ResolvedEntity::Room(room.clone()));
        }
        if let Some(equipment) = self.equipment.iter().find(|item| item.barcode == code) {
            return Some(ResolvedEntity::Equipment(equipment.clone()));
        }

        DeepLink::parse(code).and_then(|link| self.select(link.entity_id()))
    }

    pub async fn resolve<B: Backend + ?Sized>(
        &self,
        backend: &B,
        payload: &str,
    ) -> Result<ResolvedEntity> {
        let code = scanned_code(payload)?;

        match self.resolve_local(code) {
            Some(entity) => Ok(entity),
            None => resolve_remote(backend, code).await,
        }
    }
}

/// Strips the line ending or padding a scanner adds around the code.
pub(crate) fn scanned_code(payload: &str) -> Result<&str> {
    let code = payload.trim();
    if code.is_empty() {
        return Err(ClientError::field("payload", "scanned code is empty"));
    }
    Ok(code)
}

pub(crate) async fn resolve_remote<B: Backend + ?Sized>(
    backend: &B,
    code: &str,
) -> Result<ResolvedEntity> {
    if let Some(room) = backend.room_by_code(code).await? {
        return Ok(ResolvedEntity::Room(room));
    }
    if let Some(equipment) = backend.equipment_by_code(code).await? {
        return Ok(ResolvedEntity::Equipment(equipment));
    }

    log::info!("scanned code {code} matched nothing");

    Err(ClientError::NotFound {
        payload: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FakeBackend, equipment, room};

    fn resolver() -> IdentifierResolver {
        IdentifierResolver::new(
            vec![room(1, "Lab Kimia", "RM-001"), room(2, "Cold Room", "SHARED")],
            vec![
                equipment(7, "Freezer A", "EQ-007", Some(EquipmentKind::Temperature)),
                equipment(8, "Mikroskop", "SHARED", Some(EquipmentKind::Inspection)),
            ],
        )
    }

    #[tokio::test]
    async fn test_local_codes_resolve_without_network() {
        let backend = FakeBackend::default();
        let resolver = resolver();

        let entity = resolver.resolve(&backend, "EQ-007\n").await.unwrap();
        assert_eq!(entity.entity_id(), EntityId::Equipment(7));

        let entity = resolver.resolve(&backend, "SHARED").await.unwrap();
        assert_eq!(entity.entity_id(), EntityId::Room(2));

        assert_eq!(backend.lookups(), 0);
    }

    #[tokio::test]
    async fn test_deep_link_resolves_loaded_entity() {
        let backend = FakeBackend::default();
        let resolver = resolver();

        let entity = resolver
            .resolve(&backend, "https://lab.example/scan?equipmentId=8")
            .await
            .unwrap();
        assert_eq!(entity.entity_id(), EntityId::Equipment(8));
        assert_eq!(backend.lookups(), 0);
    }

    #[tokio::test]
    async fn test_unknown_code_falls_back_to_server() {
        let backend = FakeBackend::default();
        backend.add_room(room(3, "Lab Baru", "RM-NEW"));
        let resolver = resolver();

        let entity = resolver.resolve(&backend, "RM-NEW").await.unwrap();
        assert_eq!(entity.entity_id(), EntityId::Room(3));

        let error = resolver.resolve(&backend, "XYZ-999").await.unwrap_err();
        assert!(matches!(error, ClientError::NotFound { ref payload } if payload == "XYZ-999"));
        assert_eq!(backend.lookups(), 3);
    }

    #[tokio::test]
    async fn test_deep_link_to_unloaded_entity_is_looked_up_as_code() {
        let backend = FakeBackend::default();
        let resolver = resolver();

        let payload = "https://lab.example/scan?roomId=99";
        let error = resolver.resolve(&backend, payload).await.unwrap_err();
        assert!(matches!(error, ClientError::NotFound { .. }));
        assert_eq!(backend.lookups(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_is_transient() {
        let backend = FakeBackend::default();
        backend.fail_lookups(true);

        let error = resolver().resolve(&backend, "XYZ-999").await.unwrap_err();
        assert!(error.is_retryable());

        let error = resolver().resolve(&backend, "   ").await.unwrap_err();
        assert!(matches!(error, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_load_fetches_both_lists() {
        let backend = FakeBackend::default();
        backend.add_room(room(3, "Lab Baru", "RM-NEW"));

        let resolver = IdentifierResolver::load(&backend).await.unwrap();
        assert_eq!(resolver.rooms().len(), 1);
        assert!(resolver.equipment().is_empty());
        assert!(resolver.select(EntityId::Room(3)).is_some());
        assert!(resolver.select(EntityId::Equipment(3)).is_none());
    }
}
