//! Common test utilities for integration tests.
//!
//! Every test builds its own in-memory application state, so tests are
//! independent and need no external services.

// Helpers are shared across test binaries and not every binary uses all of them.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use signage_console_api::{
    app::{create_app, AppState},
    config::{
        ActivityConfig, AnnouncementsConfig, Config, DirectoryConfig, LoggingConfig,
        SecurityConfig, ServerConfig,
    },
};
use std::sync::Arc;
use tower::ServiceExt;

use domain::services::{AnnouncementDelivery, MockDelivery};

/// Test configuration with an empty directory.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            max_body_size: 1048576,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
        },
        directory: DirectoryConfig {
            seed_demo_data: false,
            event_buffer: 64,
        },
        activity: ActivityConfig { capacity: 100 },
        announcements: AnnouncementsConfig {
            default_per_page: 10,
            max_per_page: 100,
            schedule_sweep_secs: 60,
        },
    }
}

/// Test configuration seeded with the demo fleet and announcements.
pub fn seeded_config() -> Config {
    let mut config = test_config();
    config.directory.seed_demo_data = true;
    config
}

/// Application over an empty directory, plus its state for direct inspection.
pub fn create_test_app() -> (Router, AppState) {
    build(test_config(), Arc::new(MockDelivery::new()))
}

/// Application over the demo fleet (18 clients, 3 groups, 5 announcements).
pub fn seeded_test_app() -> (Router, AppState) {
    build(seeded_config(), Arc::new(MockDelivery::new()))
}

/// Seeded application whose delivery channel always fails.
pub fn failing_delivery_app() -> (Router, AppState) {
    build(seeded_config(), Arc::new(MockDelivery::failing()))
}

fn build(config: Config, delivery: Arc<dyn AnnouncementDelivery>) -> (Router, AppState) {
    let state = AppState::with_delivery(config, delivery);
    (create_app(state.clone()), state)
}

/// Build a request with a JSON body.
pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a request without a body.
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    empty_request(Method::GET, uri)
}

pub fn delete_request(uri: &str) -> Request<Body> {
    empty_request(Method::DELETE, uri)
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

/// Sends a request and returns the status with the parsed body.
pub async fn send(
    app: &Router,
    request: Request<Body>,
) -> (axum::http::StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

/// Creates a client through the API and returns its JSON.
pub async fn create_client(app: &Router, name: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/clients",
            serde_json::json!({ "name": name }),
        ),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
    body
}

/// Creates a group through the API and returns its JSON.
pub async fn create_group(app: &Router, name: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/groups",
            serde_json::json!({ "name": name }),
        ),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
    body
}
