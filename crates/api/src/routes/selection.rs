//! Selection routes: the operator's current pick of clients and groups.

use axum::{extract::State, Json};
use domain::services::DirectoryStore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;

/// Body for selection toggles.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SelectionRequest {
    pub selected: bool,
}

/// Current selection, in selection order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selected_clients: Vec<String>,
    pub selected_groups: Vec<String>,
}

impl SelectionResponse {
    pub fn from_store(store: &DirectoryStore) -> Self {
        Self {
            selected_clients: store.selected_clients().to_vec(),
            selected_groups: store.selected_groups().to_vec(),
        }
    }
}

/// Get the current selection.
///
/// GET /api/v1/selection
pub async fn get_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    let store = state.directory.read().await;
    Json(SelectionResponse::from_store(&store))
}

/// Clear every client and group selection.
///
/// DELETE /api/v1/selection
pub async fn clear_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    let mut store = state.directory.write().await;
    store.clear_all_selections();
    info!("Selection cleared");
    Json(SelectionResponse::from_store(&store))
}
