use std::sync::Arc;

use labtrack_api::DeepLink;
use labtrack_api::models::{EntityId, ResolvedEntity};

use crate::configs::Storage;
use crate::errors::{ApiError, ScanError};
use crate::repositories::{EquipmentRepository, RoomRepository};

/// Maps a scanned or typed code to the room or equipment it identifies.
///
/// Resolution order: room barcode, equipment barcode, then an embedded deep
/// link id. Rooms win over equipment at every step.
#[derive(Clone)]
pub struct ResolverService {
    room_repository: Arc<RoomRepository>,
    equipment_repository: Arc<EquipmentRepository>,
}

impl ResolverService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            room_repository: Arc::new(RoomRepository::new(storage.clone())),
            equipment_repository: Arc::new(EquipmentRepository::new(storage)),
        }
    }

    pub async fn resolve(&self, payload: &str) -> Result<ResolvedEntity, ApiError> {
        let code = payload.trim();
        if code.is_empty() {
            return Err(ScanError::EmptyPayload.into());
        }

        if let Some(room) = self.room_repository.find_by_barcode(code).await? {
            return Ok(ResolvedEntity::Room(room.into()));
        }

        if let Some(equipment) = self.equipment_repository.find_by_barcode(code).await? {
            return Ok(ResolvedEntity::Equipment(equipment.into()));
        }

        if let Some(link) = DeepLink::parse(code) {
            if let Some(entity) = self.find(link.entity_id()).await? {
                return Ok(entity);
            }
        }

        tracing::debug!("scan payload {code} matched nothing");

        Err(ScanError::CodeNotFound(code.to_string()).into())
    }

    pub async fn find(&self, id: EntityId) -> Result<Option<ResolvedEntity>, sqlx::Error> {
        let entity = match id {
            EntityId::Room(id) => self
                .room_repository
                .find_by_id(id)
                .await?
                .map(|room| ResolvedEntity::Room(room.into())),
            EntityId::Equipment(id) => self
                .equipment_repository
                .find_by_id(id)
                .await?
                .map(|equipment| ResolvedEntity::Equipment(equipment.into())),
        };

        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use labtrack_api::models::EquipmentKind;

    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_resolve_room_code() {
        let storage = setup_test_db().await;
        let room = create_test_room(storage.clone(), "Lab Kimia", "RM-001").await;
        let resolver = ResolverService::new(storage);

        let entity = resolver.resolve(" RM-001\n").await.unwrap();

        assert_eq!(entity.entity_id(), EntityId::Room(room.id));
    }

    #[tokio::test]
    async fn test_resolve_equipment_code() {
        let storage = setup_test_db().await;
        let equipment = create_test_equipment(storage.clone(), "Autoclave", "EQ-001", Some(EquipmentKind::Inspection)).await;
        let resolver = ResolverService::new(storage);

        let entity = resolver.resolve("EQ-001").await.unwrap();

        assert_eq!(entity.entity_id(), EntityId::Equipment(equipment.id));
        assert_eq!(entity.inferred_kind(), Some(EquipmentKind::Inspection));
    }

    #[tokio::test]
    async fn test_resolve_deep_link() {
        let storage = setup_test_db().await;
        let equipment = create_test_equipment(storage.clone(), "Freezer", "EQ-001", None).await;
        let resolver = ResolverService::new(storage);

        let payload = format!("https://lab.example.org/scan?equipmentId={}", equipment.id);
        let entity = resolver.resolve(&payload).await.unwrap();

        assert_eq!(entity.entity_id(), EntityId::Equipment(equipment.id));
    }

    #[tokio::test]
    async fn test_unknown_code_names_payload() {
        let storage = setup_test_db().await;
        let resolver = ResolverService::new(storage);

        let result = resolver.resolve("XYZ-999").await;

        match result {
            Err(ApiError::ScanError(ScanError::CodeNotFound(payload))) => {
                assert_eq!(payload, "XYZ-999")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deep_link_to_missing_entity_is_not_found() {
        let storage = setup_test_db().await;
        let resolver = ResolverService::new(storage);

        let result = resolver
            .resolve("https://lab.example.org/scan?roomId=41")
            .await;

        assert!(matches!(
            result,
            Err(ApiError::ScanError(ScanError::CodeNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_blank_payload_is_rejected() {
        let storage = setup_test_db().await;
        let resolver = ResolverService::new(storage);

        assert!(matches!(
            resolver.resolve("   ").await,
            Err(ApiError::ScanError(ScanError::EmptyPayload))
        ));
    }
}
