//! Client routes: the signage displays in the directory.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Client, ClientPatch, ClientStatus, CreateClientRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::selection::{SelectionRequest, SelectionResponse};

/// Query parameters for listing clients.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsQuery {
    /// Case-insensitive match on name or id.
    pub q: Option<String>,
    pub status: Option<ClientStatus>,
    pub group_id: Option<String>,
    /// Only clients without a group.
    #[serde(default)]
    pub ungrouped: bool,
}

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub data: Vec<Client>,
    pub total: usize,
}

/// Body for deleting several clients.
///
/// Without `ids` the current selection is deleted and then cleared.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct BulkDeleteClientsRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one client id is required"))]
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteClientsResponse {
    pub deleted: usize,
    pub client_ids: Vec<String>,
}

/// Clients keyed by group id, plus the clients in no group.
#[derive(Debug, Serialize)]
pub struct GroupedClientsResponse {
    pub groups: BTreeMap<String, Vec<Client>>,
    pub ungrouped: Vec<Client>,
}

/// List clients.
///
/// GET /api/v1/clients?q=&status=&groupId=&ungrouped=
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> Json<ClientListResponse> {
    let clients = state
        .directory
        .read()
        .await
        .filter_clients(query.q.as_deref().unwrap_or_default());

    let data: Vec<Client> = clients
        .into_iter()
        .filter(|c| query.status.map_or(true, |s| c.status == s))
        .filter(|c| query.group_id.as_deref().map_or(true, |g| c.in_group(g)))
        .filter(|c| !query.ungrouped || !c.is_grouped())
        .collect();

    Json(ClientListResponse {
        total: data.len(),
        data,
    })
}

/// Add a client.
///
/// POST /api/v1/clients
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    request.validate()?;

    let client = state.directory.write().await.add_client(request)?;

    info!(client_id = %client.id, name = %client.name, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

/// Get a client.
///
/// GET /api/v1/clients/:client_id
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<Client>, ApiError> {
    state
        .directory
        .read()
        .await
        .get_client(&client_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Client not found: {}", client_id)))
}

/// Update a client. Absent fields are kept; `null` clears optional fields.
///
/// PATCH /api/v1/clients/:client_id
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(patch): Json<ClientPatch>,
) -> Result<Json<Client>, ApiError> {
    patch.validate()?;

    let client = state
        .directory
        .write()
        .await
        .update_client(&client_id, patch)?;

    info!(client_id = %client.id, "Client updated");
    Ok(Json(client))
}

/// Delete a client. It also leaves its group and the selection.
///
/// DELETE /api/v1/clients/:client_id
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.directory.write().await.delete_client(&client_id)?;

    info!(client_id = %removed.id, name = %removed.name, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several clients, or the selected ones when no ids are given.
///
/// Unknown ids are skipped.
///
/// POST /api/v1/clients/bulk-delete
pub async fn bulk_delete_clients(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteClientsRequest>,
) -> Result<Json<BulkDeleteClientsResponse>, ApiError> {
    request.validate()?;

    let removed = {
        let mut store = state.directory.write().await;
        match request.ids.as_deref() {
            Some(ids) => store.delete_clients(ids),
            None => store.delete_selected_clients(),
        }
    };

    info!(deleted = removed.len(), "Deleted {} clients", removed.len());
    Ok(Json(BulkDeleteClientsResponse {
        deleted: removed.len(),
        client_ids: removed.into_iter().map(|c| c.id).collect(),
    }))
}

/// Select or deselect a client.
///
/// PUT /api/v1/clients/:client_id/selection
pub async fn set_client_selection(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let mut store = state.directory.write().await;
    store.select_client(&client_id, request.selected)?;
    Ok(Json(SelectionResponse::from_store(&store)))
}

/// Select every client.
///
/// POST /api/v1/clients/select-all
pub async fn select_all_clients(State(state): State<AppState>) -> Json<SelectionResponse> {
    let mut store = state.directory.write().await;
    let selected = store.select_all_clients();
    info!(selected, "All clients selected");
    Json(SelectionResponse::from_store(&store))
}

/// Clients organized by group.
///
/// GET /api/v1/clients/grouped
pub async fn grouped_clients(State(state): State<AppState>) -> Json<GroupedClientsResponse> {
    let store = state.directory.read().await;
    Json(GroupedClientsResponse {
        groups: store.get_grouped_clients(),
        ungrouped: store.get_ungrouped_clients(),
    })
}
