//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Duration;

use crate::app::AppState;

const READY_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub directory: DirectoryHealth,
}

/// Directory store figures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DirectoryHealth {
    pub clients: usize,
    pub groups: usize,
    pub revision: u64,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let directory = state.directory.read().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        directory: DirectoryHealth {
            clients: directory.clients().len(),
            groups: directory.groups().len(),
            revision: directory.revision(),
        },
    })
}

/// Readiness probe.
///
/// Ready when the directory store can be read within a short timeout.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if tokio::time::timeout(READY_LOCK_TIMEOUT, state.directory.read())
        .await
        .is_ok()
    {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Liveness probe.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
