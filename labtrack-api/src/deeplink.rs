//! Deep links embedding an entity id, printed as QR codes and used to pre-select an
//! entity on the capture view: `https://host/scan?roomId=3` or `...?equipmentId=7`.

use url::Url;

use crate::models::EntityId;

pub const ROOM_PARAM: &str = "roomId";
pub const EQUIPMENT_PARAM: &str = "equipmentId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeepLink(pub EntityId);

impl DeepLink {
    /// Extracts an entity id from a scanned payload.
    ///
    /// Returns `None` for anything that is not an http(s) URL carrying a numeric id
    /// parameter; such payloads are treated as raw identifier codes by the caller.
    ///
    /// Only the first occurrence of each parameter counts: `?roomId=abc&roomId=5` carries
    /// no room id. When both parameters yield an id the room id wins.
    pub fn parse(payload: &str) -> Option<Self> {
        let url = Url::parse(payload.trim()).ok()?;

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let mut room: Option<Option<i32>> = None;
        let mut equipment: Option<Option<i32>> = None;

        for (key, value) in url.query_pairs() {
            let slot = match key.as_ref() {
                ROOM_PARAM => &mut room,
                EQUIPMENT_PARAM => &mut equipment,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.parse::<i32>().ok());
            }
        }

        room.flatten()
            .map(EntityId::Room)
            .or(equipment.flatten().map(EntityId::Equipment))
            .map(DeepLink)
    }

    /// Builds the link for `base`, replacing any query it already has.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(None);

        let (key, id) = match self.0 {
            EntityId::Room(id) => (ROOM_PARAM, id),
            EntityId::Equipment(id) => (EQUIPMENT_PARAM, id),
        };
        url.query_pairs_mut().append_pair(key, &id.to_string());

        url
    }

    pub fn entity_id(&self) -> EntityId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_room_link() {
        let link = DeepLink::parse("https://lab.example.org/scan?roomId=12").unwrap();
        assert_eq!(link.entity_id(), EntityId::Room(12));
    }

    #[test]
    fn test_parse_equipment_link_among_other_params() {
        let link =
            DeepLink::parse(" http://lab.local/scan?utm=qr&equipmentId=4&x=1 ").unwrap();
        assert_eq!(link.entity_id(), EntityId::Equipment(4));
    }

    #[test]
    fn test_room_param_wins_when_both_present() {
        let link = DeepLink::parse("https://lab/scan?equipmentId=4&roomId=9").unwrap();
        assert_eq!(link.entity_id(), EntityId::Room(9));
    }

    #[test]
    fn test_first_occurrence_is_authoritative() {
        assert!(DeepLink::parse("https://lab/scan?roomId=abc&roomId=5").is_none());

        let link = DeepLink::parse("https://lab/scan?roomId=3&roomId=5").unwrap();
        assert_eq!(link.entity_id(), EntityId::Room(3));

        let link = DeepLink::parse("https://lab/scan?roomId=&equipmentId=4").unwrap();
        assert_eq!(link.entity_id(), EntityId::Equipment(4));
    }

    #[test]
    fn test_plain_codes_are_not_links() {
        assert!(DeepLink::parse("LAB-KIMIA-002").is_none());
        assert!(DeepLink::parse("https://lab/scan?roomId=abc").is_none());
        assert!(DeepLink::parse("https://lab/scan").is_none());
        assert!(DeepLink::parse("mailto:lab@example.org?roomId=1").is_none());
    }

    #[test]
    fn test_to_url_replaces_existing_query() {
        let base = Url::parse("https://lab.example.org/scan?roomId=1").unwrap();
        let url = DeepLink(EntityId::Equipment(42)).to_url(&base);

        assert_eq!(url.as_str(), "https://lab.example.org/scan?equipmentId=42");
        assert_eq!(
            DeepLink::parse(url.as_str()).map(|link| link.entity_id()),
            Some(EntityId::Equipment(42))
        );
    }
}
