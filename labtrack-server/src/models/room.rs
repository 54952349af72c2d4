use labtrack_api::models::RoomResponse;
use labtrack_api::ThresholdProfile;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub barcode: String,
    /// JSON encoded [`ThresholdProfile`], absent when it follows the name.
    pub threshold_profile: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Room {
    pub fn profile(&self) -> Option<ThresholdProfile> {
        decode_profile(self.threshold_profile.as_deref())
    }
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            threshold_profile: room.profile(),
            id: room.id,
            name: room.name,
            location: room.location,
            barcode: room.barcode,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

pub(crate) fn encode_profile(profile: Option<ThresholdProfile>) -> Option<String> {
    profile.and_then(|profile| serde_json::to_string(&profile).ok())
}

pub(crate) fn decode_profile(raw: Option<&str>) -> Option<ThresholdProfile> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!("ignoring unreadable threshold profile {raw}: {e}");
            None
        }
    }
}

#[derive(Clone)]
pub struct RoomTable;

impl Table for RoomTable {
    fn name(&self) -> &'static str {
        "rooms"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS rooms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                barcode TEXT NOT NULL UNIQUE,
                threshold_profile TEXT,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS rooms;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_round_trips_through_text_column() {
        let raw = encode_profile(Some(ThresholdProfile::Incubator));
        assert_eq!(
            decode_profile(raw.as_deref()),
            Some(ThresholdProfile::Incubator)
        );
        assert_eq!(encode_profile(None), None);
    }

    #[test]
    fn test_unreadable_profile_is_ignored() {
        assert_eq!(decode_profile(Some("not json")), None);
    }
}
