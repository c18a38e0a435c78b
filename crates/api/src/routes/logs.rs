//! Activity log routes.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{ActivityEntry, ActivityLevel};
use serde::Deserialize;
use shared::pagination::{Page, PageRequest};

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsQuery {
    pub level: Option<ActivityLevel>,
    pub q: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Newest-first activity entries.
///
/// GET /api/v1/logs?level=&q=&page=&perPage=
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<Page<ActivityEntry>>, ApiError> {
    let limits = &state.config.announcements;
    let request = PageRequest::from_query(
        query.page,
        query.per_page,
        limits.default_per_page,
        limits.max_per_page,
    )?;

    let page = state
        .activity
        .read()
        .await
        .list(query.level, query.q.as_deref(), request);
    Ok(Json(page))
}
