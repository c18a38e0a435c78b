//! Dashboard overview route.

use axum::{extract::State, Json};
use domain::models::StatusSummary;
use domain::services::StatusCounts;
use serde::Serialize;

use crate::app::AppState;
use crate::routes::selection::SelectionResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub clients: StatusSummary,
    pub announcements: StatusCounts,
    pub selection: SelectionResponse,
    /// Directory revision the figures were read at.
    pub revision: u64,
}

/// Fleet health, announcement counts and the current selection.
///
/// GET /api/v1/overview
pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let directory = state.directory.read().await;
    let announcements = state.announcements.read().await.counts_by_status();

    Json(OverviewResponse {
        clients: directory.status_summary(),
        announcements,
        selection: SelectionResponse::from_store(&directory),
        revision: directory.revision(),
    })
}
