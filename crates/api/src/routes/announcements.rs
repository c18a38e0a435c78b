//! Announcement routes: the board, sends and the quick broadcast form.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{
    ActivityLevel, Announcement, AnnouncementPatch, AnnouncementQuery, AnnouncementStatus,
    AudienceTarget, BroadcastRequest, CreateAnnouncementRequest, SortDirection, SortField,
};
use serde::{Deserialize, Serialize};
use shared::pagination::Page;
use std::str::FromStr;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{self, record_activity, SendOutcome};

/// Query parameters for listing announcements.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnnouncementsQuery {
    /// Case-insensitive match on title or content.
    pub q: Option<String>,
    /// Comma-separated statuses, e.g. `draft,active`.
    pub status: Option<String>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ListAnnouncementsQuery {
    fn into_query(self) -> Result<AnnouncementQuery, ApiError> {
        let statuses = match self.status.as_deref() {
            Some(raw) => parse_statuses(raw)?,
            None => Vec::new(),
        };

        Ok(AnnouncementQuery {
            search: self.q,
            statuses,
            sort_field: self.sort.unwrap_or_default(),
            sort_direction: self.direction.unwrap_or_default(),
            page: self.page,
            per_page: self.per_page,
        })
    }
}

fn parse_statuses(raw: &str) -> Result<Vec<AnnouncementStatus>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| AnnouncementStatus::from_str(s).map_err(ApiError::Validation))
        .collect()
}

/// Body for sending a single announcement.
#[derive(Debug, Default, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub target: AudienceTarget,
}

impl SendRequest {
    /// Parses a send body; an empty body targets every client.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::Validation(format!("Invalid send request: {}", e)))
    }
}

/// Body for bulk actions on announcements.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkIdsRequest {
    #[validate(length(min = 1, message = "At least one announcement id is required"))]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
pub struct SkippedSend {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BulkSendResponse {
    pub sent: Vec<SendOutcome>,
    pub skipped: Vec<SkippedSend>,
}

/// List announcements with filtering, sorting and pagination.
///
/// GET /api/v1/announcements?q=&status=&sort=&direction=&page=&perPage=
pub async fn list_announcements(
    State(state): State<AppState>,
    Query(query): Query<ListAnnouncementsQuery>,
) -> Result<Json<Page<Announcement>>, ApiError> {
    let query = query.into_query()?;
    let limits = &state.config.announcements;

    let page = state.announcements.read().await.list(
        &query,
        limits.default_per_page,
        limits.max_per_page,
    )?;
    Ok(Json(page))
}

/// Create an announcement.
///
/// POST /api/v1/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    request.validate()?;

    let announcement = state
        .announcements
        .write()
        .await
        .create(request, Utc::now())?;

    record_activity(
        &state,
        ActivityLevel::Info,
        format!("Announcement \"{}\" created", announcement.title),
    )
    .await;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// Get an announcement.
///
/// GET /api/v1/announcements/:announcement_id
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
) -> Result<Json<Announcement>, ApiError> {
    state
        .announcements
        .read()
        .await
        .get(&announcement_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!("Announcement not found: {}", announcement_id))
        })
}

/// Update an announcement.
///
/// PATCH /api/v1/announcements/:announcement_id
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    Json(patch): Json<AnnouncementPatch>,
) -> Result<Json<Announcement>, ApiError> {
    patch.validate()?;

    let announcement = state
        .announcements
        .write()
        .await
        .update(&announcement_id, patch, Utc::now())?;

    record_activity(
        &state,
        ActivityLevel::Info,
        format!("Announcement \"{}\" updated", announcement.title),
    )
    .await;
    Ok(Json(announcement))
}

/// Delete an announcement.
///
/// DELETE /api/v1/announcements/:announcement_id
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .announcements
        .write()
        .await
        .delete(&announcement_id)?;

    record_activity(
        &state,
        ActivityLevel::Warning,
        format!("Announcement \"{}\" deleted", removed.title),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several announcements; unknown ids are ignored.
///
/// POST /api/v1/announcements/bulk-delete
pub async fn bulk_delete_announcements(
    State(state): State<AppState>,
    Json(request): Json<BulkIdsRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    request.validate()?;

    let deleted = state.announcements.write().await.delete_many(&request.ids);

    if deleted > 0 {
        record_activity(
            &state,
            ActivityLevel::Warning,
            format!("{} announcement(s) deleted", deleted),
        )
        .await;
    }
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// Send an announcement to a client, a group, the selection or everyone.
///
/// An empty body sends to every client.
///
/// POST /api/v1/announcements/:announcement_id/send
pub async fn send_announcement(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    body: Bytes,
) -> Result<Json<SendOutcome>, ApiError> {
    let target = SendRequest::from_body(&body)?.target;
    let outcome = services::send_announcement(&state, &announcement_id, &target).await?;

    info!(
        announcement_id = %announcement_id,
        audience = %outcome.audience.description,
        recipients = outcome.audience.recipient_count(),
        "Announcement sent"
    );
    Ok(Json(outcome))
}

/// Send several announcements to every client.
///
/// Missing and completed announcements are reported as skipped.
///
/// POST /api/v1/announcements/send
pub async fn bulk_send_announcements(
    State(state): State<AppState>,
    Json(request): Json<BulkIdsRequest>,
) -> Result<Json<BulkSendResponse>, ApiError> {
    request.validate()?;

    let mut sent = Vec::new();
    let mut skipped = Vec::new();
    for id in &request.ids {
        match services::send_announcement(&state, id, &AudienceTarget::All).await {
            Ok(outcome) => sent.push(outcome),
            Err(err @ (ApiError::NotFound(_) | ApiError::Conflict(_))) => {
                warn!(announcement_id = %id, error = %err, "Skipping announcement in bulk send");
                skipped.push(SkippedSend {
                    id: id.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(sent = sent.len(), skipped = skipped.len(), "Bulk send finished");
    Ok(Json(BulkSendResponse { sent, skipped }))
}

/// Create an announcement from the quick form and send it immediately.
///
/// POST /api/v1/announcements/broadcast
pub async fn broadcast_announcement(
    State(state): State<AppState>,
    Json(request): Json<BroadcastRequest>,
) -> Result<(StatusCode, Json<SendOutcome>), ApiError> {
    request.validate()?;

    let outcome = services::broadcast_announcement(
        &state,
        request.to_create_request(Utc::now()),
        &request.target,
    )
    .await?;

    info!(
        announcement_id = %outcome.announcement.id,
        audience = %outcome.audience.description,
        "Broadcast sent"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}
