use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use labtrack_api::models::{ChangeTable, CreateRoomRequest};
use serde_json::json;
use tokio_stream::StreamExt;
use tower::ServiceExt;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_events_stream_table_changes() {
    let app = MockApp::new().await.with_event_handle();

    let request = Request::builder()
        .uri("/api/events?tables=rooms")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert!(app.change_feed.has_subscribers(ChangeTable::Rooms));

    let room = app
        .entity_service
        .create_room(CreateRoomRequest {
            name: String::from("Lab Kimia"),
            location: String::from("Gedung A"),
            barcode: String::from("RM-001"),
            threshold_profile: None,
        })
        .await
        .unwrap();

    let mut stream = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let frame = String::from_utf8(chunk.to_vec()).unwrap();

    assert!(frame.contains("event: rooms"));
    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let event: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["table"], json!("rooms"));
    assert_eq!(event["kind"], json!("insert"));
    assert_eq!(event["id"], json!(room.id));

    drop(stream);
    assert_eq!(app.change_feed.channel_count(), 0);
}

#[tokio::test]
async fn test_events_reject_unknown_table() {
    let app = MockApp::new().await.with_event_handle();

    let (status, body) = app
        .send(
            Method::GET,
            "/api/events?tables=rooms,windows",
            Some(&app.token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["fields"][0]["field"], json!("tables"));
    assert_eq!(app.change_feed.channel_count(), 0);
}
