use axum::http::{Method, StatusCode};
use labtrack_server::tests::{create_test_equipment, create_test_room};
use serde_json::json;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_resolve_barcode() {
    let app = MockApp::new().await.with_scan_handle();
    let room = create_test_room(app.storage.clone(), "Lab Kimia", "RM-001").await;
    let equipment = create_test_equipment(app.storage.clone(), "Freezer A", "EQ-001", None).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/scan/resolve",
            Some(&app.token),
            Some(json!({ "payload": " RM-001\n" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity"], json!("room"));
    assert_eq!(body["id"], json!(room.id));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/scan/resolve",
            Some(&app.token),
            Some(json!({ "payload": "EQ-001" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity"], json!("equipment"));
    assert_eq!(body["id"], json!(equipment.id));
}

#[tokio::test]
async fn test_resolve_deep_link() {
    let app = MockApp::new().await.with_scan_handle();
    let equipment = create_test_equipment(app.storage.clone(), "Freezer A", "EQ-001", None).await;

    let payload = format!("https://lab.example/scan?equipmentId={}", equipment.id);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/scan/resolve",
            Some(&app.token),
            Some(json!({ "payload": payload })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity"], json!("equipment"));
    assert_eq!(body["name"], json!("Freezer A"));
}

#[tokio::test]
async fn test_resolve_unknown_code_names_payload() {
    let app = MockApp::new().await.with_scan_handle();
    create_test_room(app.storage.clone(), "Lab Kimia", "RM-001").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/scan/resolve",
            Some(&app.token),
            Some(json!({ "payload": "XYZ-404" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("XYZ-404"));

    let (status, _) = app
        .send(
            Method::POST,
            "/api/scan/resolve",
            Some(&app.token),
            Some(json!({ "payload": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
