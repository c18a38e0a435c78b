//! Announcement delivery to signage clients.
//!
//! Provides the seam between the announcement board and whatever transport
//! pushes content to displays.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Announcement, AnnouncementPriority, ResolvedAudience};

/// Payload handed to a delivery backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPayload {
    pub announcement_id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<AnnouncementPriority>,
    pub audience: String,
    pub client_ids: Vec<String>,
    pub sent_at: DateTime<Utc>,
}

impl AnnouncementPayload {
    pub fn new(announcement: &Announcement, audience: &ResolvedAudience, sent_at: DateTime<Utc>) -> Self {
        Self {
            announcement_id: announcement.id.clone(),
            title: announcement.title.clone(),
            content: announcement.content.clone(),
            priority: announcement.priority,
            audience: audience.description.clone(),
            client_ids: audience.client_ids.clone(),
            sent_at,
        }
    }
}

/// Result of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// Delivered to this many clients.
    Sent { recipients: usize },
    /// Nobody to deliver to.
    Skipped,
    /// Delivery failed (non-blocking for the caller).
    Failed(String),
}

impl DeliveryResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryResult::Sent { .. })
    }
}

/// Delivery backend for announcements.
#[async_trait::async_trait]
pub trait AnnouncementDelivery: Send + Sync {
    /// Push an announcement to the resolved clients.
    async fn deliver(&self, payload: AnnouncementPayload) -> DeliveryResult;
}

/// Mock delivery for development and testing.
///
/// Logs deliveries but doesn't actually send them.
#[derive(Debug, Clone, Default)]
pub struct MockDelivery {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    /// Create a mock delivery that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl AnnouncementDelivery for MockDelivery {
    async fn deliver(&self, payload: AnnouncementPayload) -> DeliveryResult {
        if self.simulate_failure {
            tracing::warn!(
                announcement_id = %payload.announcement_id,
                "Mock delivery simulating failure"
            );
            return DeliveryResult::Failed("Simulated failure".to_string());
        }

        if payload.client_ids.is_empty() {
            tracing::info!(
                announcement_id = %payload.announcement_id,
                audience = %payload.audience,
                "Mock: No recipients, skipping delivery"
            );
            return DeliveryResult::Skipped;
        }

        tracing::info!(
            announcement_id = %payload.announcement_id,
            title = %payload.title,
            audience = %payload.audience,
            recipients = payload.client_ids.len(),
            "Mock: Would deliver announcement"
        );

        DeliveryResult::Sent {
            recipients: payload.client_ids.len(),
        }
    }
}
