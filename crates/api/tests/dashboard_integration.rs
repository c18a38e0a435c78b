//! Integration tests for the overview, activity log, health and middleware.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, get_request, json_request, seeded_test_app, send};
use domain::models::ActivityLevel;
use serde_json::json;
use signage_console_api::middleware::REQUEST_ID_HEADER;
use tower::ServiceExt;

#[tokio::test]
async fn test_overview_of_demo_fleet() {
    let (app, _) = seeded_test_app();

    let (status, body) = send(&app, get_request("/api/v1/overview")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clients"]["totalClients"], 18);
    assert_eq!(body["clients"]["connected"], 12);
    assert_eq!(body["clients"]["warning"], 3);
    assert_eq!(body["clients"]["error"], 2);
    assert_eq!(body["clients"]["inactive"], 1);
    assert_eq!(body["clients"]["ungrouped"], 3);
    assert_eq!(body["clients"]["groups"], 3);
    assert_eq!(body["announcements"]["active"], 2);
    assert_eq!(body["announcements"]["completed"], 1);
    assert_eq!(body["selection"]["selectedClients"], json!([]));
}

#[tokio::test]
async fn test_overview_tracks_revision() {
    let (app, _) = create_test_app();

    let (_, before) = send(&app, get_request("/api/v1/overview")).await;
    send(
        &app,
        json_request(Method::POST, "/api/v1/groups", json!({ "name": "Lobby" })),
    )
    .await;
    let (_, after) = send(&app, get_request("/api/v1/overview")).await;

    assert_eq!(
        after["revision"].as_u64().unwrap(),
        before["revision"].as_u64().unwrap() + 1
    );
}

#[tokio::test]
async fn test_logs_newest_first_with_filters() {
    let (app, state) = create_test_app();
    {
        let mut activity = state.activity.write().await;
        activity.record(ActivityLevel::Info, "Client added".to_string(), "directory");
        activity.record(ActivityLevel::Error, "Delivery failed".to_string(), "announcements");
        activity.record(ActivityLevel::Warning, "Group deleted".to_string(), "directory");
    }

    let (status, body) = send(&app, get_request("/api/v1/logs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["message"], "Group deleted");
    assert_eq!(body["pagination"]["total"], 3);

    let (_, body) = send(&app, get_request("/api/v1/logs?level=error")).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["source"], "announcements");

    let (_, body) = send(&app, get_request("/api/v1/logs?q=client")).await;
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = send(&app, get_request("/api/v1/logs?perPage=1&page=2")).await;
    assert_eq!(body["data"][0]["message"], "Delivery failed");

    let (status, _) = send(&app, get_request("/api/v1/logs?level=debug")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/logs?page={}", usize::MAX);
    let (status, body) = send(&app, get_request(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = seeded_test_app();

    let (status, body) = send(&app, get_request("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["directory"]["clients"], 18);
    assert_eq!(body["directory"]["groups"], 3);

    let (status, body) = send(&app, get_request("/api/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, body) = send(&app, get_request("/api/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let (app, _) = create_test_app();

    let request = axum::http::Request::builder()
        .uri("/api/health/live")
        .header(REQUEST_ID_HEADER, "probe-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "probe-123");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = create_test_app();

    let (status, _) = send(&app, get_request("/api/v1/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
