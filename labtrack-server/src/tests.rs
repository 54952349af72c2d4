use std::sync::Arc;

use labtrack_api::models::{Condition, EquipmentKind, UserRole};
use time::OffsetDateTime;

use crate::configs::{Database, SchemaManager, Storage};
use crate::models::{
    Equipment, EquipmentInspection, EquipmentTemperatureLog, Room, TemperatureLog, User,
    stored_time,
};
use crate::services::AuthService;

pub const TEST_PASSWORD: &str = "test";

pub async fn setup_test_db() -> Arc<Storage> {
    Arc::new(
        Storage::new(
            Database {
                migration_path: None,
                clean_start: true,
                url: String::from("sqlite::memory:"),
            },
            SchemaManager::default(),
        )
        .await
        .unwrap(),
    )
}

pub async fn create_test_user(storage: Arc<Storage>, email: &str, is_admin: bool) -> User {
    let role = if is_admin { UserRole::Admin } else { UserRole::User };
    let password = AuthService::new().hash(TEST_PASSWORD).unwrap();

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password, full_name, role, created_at)
        VALUES ($1, $2, NULL, $3, $4)
        RETURNING *;
        "#,
    )
    .bind(email)
    .bind(password)
    .bind(role.to_string())
    .bind(stored_time(OffsetDateTime::now_utc()))
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}

pub async fn create_test_room(storage: Arc<Storage>, name: &str, barcode: &str) -> Room {
    let now = stored_time(OffsetDateTime::now_utc());

    sqlx::query_as::<_, Room>(
        r#"
        INSERT INTO rooms (name, location, barcode, threshold_profile, created_at, updated_at)
        VALUES ($1, 'Gedung A', $2, NULL, $3, $3)
        RETURNING *;
        "#,
    )
    .bind(name)
    .bind(barcode)
    .bind(now)
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}

pub async fn create_test_equipment(
    storage: Arc<Storage>,
    name: &str,
    barcode: &str,
    kind: Option<EquipmentKind>,
) -> Equipment {
    let now = stored_time(OffsetDateTime::now_utc());

    sqlx::query_as::<_, Equipment>(
        r#"
        INSERT INTO equipment (name, location, barcode, kind, threshold_profile, created_at, updated_at)
        VALUES ($1, 'Gedung A', $2, $3, NULL, $4, $4)
        RETURNING *;
        "#,
    )
    .bind(name)
    .bind(barcode)
    .bind(kind.map(|kind| kind.as_str()))
    .bind(now)
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}

pub async fn create_test_temperature_log(
    storage: Arc<Storage>,
    room_id: i32,
    recorded_by: Option<i32>,
    temperature: f64,
    recorded_at: OffsetDateTime,
) -> TemperatureLog {
    sqlx::query_as::<_, TemperatureLog>(
        r#"
        INSERT INTO temperature_logs (room_id, temperature, humidity, recorded_by, recorded_at)
        VALUES ($1, $2, NULL, $3, $4)
        RETURNING *;
        "#,
    )
    .bind(room_id)
    .bind(temperature)
    .bind(recorded_by)
    .bind(stored_time(recorded_at))
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}

pub async fn create_test_equipment_temperature_log(
    storage: Arc<Storage>,
    equipment_id: i32,
    recorded_by: Option<i32>,
    temperature: f64,
    recorded_at: OffsetDateTime,
) -> EquipmentTemperatureLog {
    sqlx::query_as::<_, EquipmentTemperatureLog>(
        r#"
        INSERT INTO equipment_temperature_logs (equipment_id, temperature, recorded_by, recorded_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *;
        "#,
    )
    .bind(equipment_id)
    .bind(temperature)
    .bind(recorded_by)
    .bind(stored_time(recorded_at))
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}

pub async fn create_test_inspection(
    storage: Arc<Storage>,
    equipment_id: i32,
    inspected_by: Option<i32>,
    condition: Condition,
    inspected_at: OffsetDateTime,
) -> EquipmentInspection {
    sqlx::query_as::<_, EquipmentInspection>(
        r#"
        INSERT INTO equipment_inspections (equipment_id, condition, notes, inspected_by, inspected_at)
        VALUES ($1, $2, NULL, $3, $4)
        RETURNING *;
        "#,
    )
    .bind(equipment_id)
    .bind(condition.as_str())
    .bind(inspected_by)
    .bind(stored_time(inspected_at))
    .fetch_one(storage.get_pool())
    .await
    .unwrap()
}
