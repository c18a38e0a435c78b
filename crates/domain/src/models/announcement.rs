//! Announcement domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_audience_labels, validate_date_order, validate_not_blank};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use super::audience::AudienceTarget;
use super::patch::FieldUpdate;

/// Lifecycle status of an announcement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementStatus {
    #[default]
    Draft,
    Scheduled,
    Active,
    Completed,
}

impl AnnouncementStatus {
    pub const ALL: [AnnouncementStatus; 4] = [
        AnnouncementStatus::Draft,
        AnnouncementStatus::Scheduled,
        AnnouncementStatus::Active,
        AnnouncementStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementStatus::Draft => "draft",
            AnnouncementStatus::Scheduled => "scheduled",
            AnnouncementStatus::Active => "active",
            AnnouncementStatus::Completed => "completed",
        }
    }

    /// Completed announcements are closed and can no longer be sent.
    pub fn is_sendable(&self) -> bool {
        !matches!(self, AnnouncementStatus::Completed)
    }
}

impl FromStr for AnnouncementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(AnnouncementStatus::Draft),
            "scheduled" => Ok(AnnouncementStatus::Scheduled),
            "active" => Ok(AnnouncementStatus::Active),
            "completed" => Ok(AnnouncementStatus::Completed),
            _ => Err(format!("Invalid announcement status: {}", s)),
        }
    }
}

impl fmt::Display for AnnouncementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency of an announcement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    #[default]
    Normal,
    High,
    Emergency,
}

impl AnnouncementPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementPriority::Normal => "normal",
            AnnouncementPriority::High => "high",
            AnnouncementPriority::Emergency => "emergency",
        }
    }
}

impl fmt::Display for AnnouncementPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message shown on signage clients.
///
/// Announcements hold no client or group ids; the audience is resolved from
/// the directory when the announcement is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub status: AnnouncementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<AnnouncementPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub send_count: u32,
}

impl Announcement {
    pub fn from_request(id: String, request: CreateAnnouncementRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: request.title,
            content: request.content,
            status: request.status.unwrap_or_default(),
            priority: request.priority,
            publish_date: request.publish_date,
            expiration_date: request.expiration_date,
            target_audience: request.target_audience,
            created_at: now,
            updated_at: now,
            last_sent_at: None,
            send_count: 0,
        }
    }

    /// Merges a patch into this announcement.
    pub fn apply(&mut self, patch: AnnouncementPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(publish_date) = patch.publish_date {
            self.publish_date = Some(publish_date);
        }
        if let Some(target_audience) = patch.target_audience {
            self.target_audience = target_audience;
        }
        patch.priority.apply_to(&mut self.priority);
        patch.expiration_date.apply_to(&mut self.expiration_date);
        self.updated_at = now;
    }

    /// Checks the publish/expiration ordering of the current field values.
    pub fn check_dates(&self) -> Result<(), ValidationError> {
        match (self.publish_date, self.expiration_date) {
            (Some(publish), Some(expiration)) => validate_date_order(publish, expiration),
            _ => Ok(()),
        }
    }
}

/// Request payload for creating an announcement.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateAnnouncementRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Content must be between 1 and 5000 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,

    pub status: Option<AnnouncementStatus>,

    pub priority: Option<AnnouncementPriority>,

    #[validate(required(message = "Publish date is required"))]
    pub publish_date: Option<DateTime<Utc>>,

    pub expiration_date: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(custom(function = "validate_audience_labels"))]
    pub target_audience: Vec<String>,
}

fn validate_create_dates(request: &CreateAnnouncementRequest) -> Result<(), ValidationError> {
    match (request.publish_date, request.expiration_date) {
        (Some(publish), Some(expiration)) => validate_date_order(publish, expiration),
        _ => Ok(()),
    }
}

/// Partial update for an announcement.
///
/// The publish date can be moved but not removed. Date ordering against the
/// stored values is checked by the board after merging.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPatch {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Content must be between 1 and 5000 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: Option<String>,

    pub status: Option<AnnouncementStatus>,

    #[serde(default)]
    pub priority: FieldUpdate<AnnouncementPriority>,

    pub publish_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub expiration_date: FieldUpdate<DateTime<Utc>>,

    #[validate(custom(function = "validate_audience_labels"))]
    pub target_audience: Option<Vec<String>>,
}

/// Quick-send form: creates an announcement and sends it right away.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Message must be between 1 and 5000 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub message: String,

    pub priority: Option<AnnouncementPriority>,

    #[serde(default)]
    pub target: AudienceTarget,
}

impl BroadcastRequest {
    /// The announcement to store, published at `now`.
    pub fn to_create_request(&self, now: DateTime<Utc>) -> CreateAnnouncementRequest {
        CreateAnnouncementRequest {
            title: self.title.clone(),
            content: self.message.clone(),
            status: Some(AnnouncementStatus::Draft),
            priority: self.priority,
            publish_date: Some(now),
            expiration_date: None,
            target_audience: Vec::new(),
        }
    }
}

/// Column an announcement list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    #[default]
    CreatedAt,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort and page parameters for listing announcements.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementQuery {
    pub search: Option<String>,
    /// Statuses to include; empty means all.
    pub statuses: Vec<AnnouncementStatus>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}
