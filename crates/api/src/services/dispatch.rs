//! Announcement dispatch: resolve the audience, record the send, deliver.
//!
//! Locks are held only while reading or updating state; delivery runs with
//! no lock held.

use chrono::{DateTime, Utc};
use domain::models::{
    ActivityLevel, Announcement, AudienceTarget, CreateAnnouncementRequest, ResolvedAudience,
};
use domain::services::{AnnouncementPayload, DeliveryResult};
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_announcement_sent;

const ACTIVITY_SOURCE: &str = "announcements";

/// Outcome of sending one announcement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub announcement: Announcement,
    pub audience: ResolvedAudience,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_error: Option<String>,
}

/// Sends announcement `id` to `target`.
pub async fn send_announcement(
    state: &AppState,
    id: &str,
    target: &AudienceTarget,
) -> Result<SendOutcome, ApiError> {
    let now = Utc::now();
    let (announcement, audience) = {
        let directory = state.directory.read().await;
        let audience = directory.resolve_audience(target)?;
        let announcement = state
            .announcements
            .write()
            .await
            .mark_sent(id, &audience, now)?;
        (announcement, audience)
    };

    Ok(deliver(state, announcement, audience, now).await)
}

/// Creates an announcement and sends it to `target` in one step.
///
/// The directory stays read-locked until the announcement is marked sent, so
/// the audience cannot disappear between creation and sending.
pub async fn broadcast_announcement(
    state: &AppState,
    request: CreateAnnouncementRequest,
    target: &AudienceTarget,
) -> Result<SendOutcome, ApiError> {
    let now = Utc::now();
    let (announcement, audience) = {
        let directory = state.directory.read().await;
        let audience = directory.resolve_audience(target)?;

        let mut board = state.announcements.write().await;
        let created = board.create(request, now)?;
        let announcement = board.mark_sent(&created.id, &audience, now)?;
        (announcement, audience)
    };

    Ok(deliver(state, announcement, audience, now).await)
}

async fn deliver(
    state: &AppState,
    announcement: Announcement,
    audience: ResolvedAudience,
    now: DateTime<Utc>,
) -> SendOutcome {
    let payload = AnnouncementPayload::new(&announcement, &audience, now);
    let result = state.delivery.deliver(payload).await;

    let (delivered, delivery_error) = match result {
        DeliveryResult::Sent { .. } | DeliveryResult::Skipped => (true, None),
        DeliveryResult::Failed(reason) => {
            warn!(
                announcement_id = %announcement.id,
                error = %reason,
                "Announcement delivery failed"
            );
            (false, Some(reason))
        }
    };
    record_announcement_sent(audience.recipient_count(), delivered);

    {
        let mut activity = state.activity.write().await;
        if delivered {
            activity.record(
                ActivityLevel::Info,
                format!(
                    "Announcement \"{}\" sent to {}",
                    announcement.title, audience.description
                ),
                ACTIVITY_SOURCE,
            );
        } else {
            activity.record(
                ActivityLevel::Error,
                format!(
                    "Announcement \"{}\" could not be delivered to {}",
                    announcement.title, audience.description
                ),
                ACTIVITY_SOURCE,
            );
        }
    }

    SendOutcome {
        announcement,
        audience,
        delivered,
        delivery_error,
    }
}

/// Records a plain activity entry for an announcement action.
pub async fn record_activity(state: &AppState, level: ActivityLevel, message: String) {
    state
        .activity
        .write()
        .await
        .record(level, message, ACTIVITY_SOURCE);
}
