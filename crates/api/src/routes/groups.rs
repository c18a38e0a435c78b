//! Group routes: named collections of clients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{Client, CreateGroupRequest, Group, GroupPatch};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::selection::{SelectionRequest, SelectionResponse};

#[derive(Debug, Default, Deserialize)]
pub struct ListGroupsQuery {
    /// Case-insensitive match on the group name.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub data: Vec<Group>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectGroupClientsResponse {
    pub newly_selected: usize,
    #[serde(flatten)]
    pub selection: SelectionResponse,
}

/// List groups with their current members.
///
/// GET /api/v1/groups?q=
pub async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<ListGroupsQuery>,
) -> Json<GroupListResponse> {
    let data = state
        .directory
        .read()
        .await
        .filter_groups(query.q.as_deref().unwrap_or_default());

    Json(GroupListResponse {
        total: data.len(),
        data,
    })
}

/// Create an empty group.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    request.validate()?;

    let group = state.directory.write().await.add_group(request);

    info!(group_id = %group.id, group_name = %group.name, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// Get a group.
///
/// GET /api/v1/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    state
        .directory
        .read()
        .await
        .get_group(&group_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Group not found: {}", group_id)))
}

/// Rename a group.
///
/// PATCH /api/v1/groups/:group_id
pub async fn update_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(patch): Json<GroupPatch>,
) -> Result<Json<Group>, ApiError> {
    patch.validate()?;

    let group = state
        .directory
        .write()
        .await
        .update_group(&group_id, patch)?;

    info!(group_id = %group.id, "Group updated");
    Ok(Json(group))
}

/// Delete a group. Its clients stay in the directory without a group.
///
/// DELETE /api/v1/groups/:group_id
pub async fn delete_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let group = state.directory.write().await.delete_group(&group_id)?;

    info!(
        group_id = %group.id,
        ungrouped = group.client_count(),
        "Group deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Current members of a group.
///
/// GET /api/v1/groups/:group_id/clients
pub async fn list_group_clients(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Client>>, ApiError> {
    let store = state.directory.read().await;
    if store.get_group(&group_id).is_none() {
        return Err(ApiError::NotFound(format!("Group not found: {}", group_id)));
    }
    Ok(Json(store.get_clients_in_group(&group_id)))
}

/// Move a client into a group.
///
/// PUT /api/v1/groups/:group_id/clients/:client_id
pub async fn add_client_to_group(
    State(state): State<AppState>,
    Path((group_id, client_id)): Path<(String, String)>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .directory
        .write()
        .await
        .add_client_to_group(&client_id, &group_id)?;

    info!(client_id = %client_id, group_id = %group_id, "Client added to group");
    Ok(Json(client))
}

/// Take a client out of a group.
///
/// DELETE /api/v1/groups/:group_id/clients/:client_id
pub async fn remove_client_from_group(
    State(state): State<AppState>,
    Path((group_id, client_id)): Path<(String, String)>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .directory
        .write()
        .await
        .remove_client_from_group(&client_id, &group_id)?;

    info!(client_id = %client_id, group_id = %group_id, "Client removed from group");
    Ok(Json(client))
}

/// Select or deselect a group.
///
/// PUT /api/v1/groups/:group_id/selection
pub async fn set_group_selection(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let mut store = state.directory.write().await;
    store.select_group(&group_id, request.selected)?;
    Ok(Json(SelectionResponse::from_store(&store)))
}

/// Add every member of a group to the client selection.
///
/// POST /api/v1/groups/:group_id/select-clients
pub async fn select_group_clients(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<SelectGroupClientsResponse>, ApiError> {
    let mut store = state.directory.write().await;
    let newly_selected = store.select_all_in_group(&group_id)?;
    Ok(Json(SelectGroupClientsResponse {
        newly_selected,
        selection: SelectionResponse::from_store(&store),
    }))
}
