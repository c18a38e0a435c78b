//! Announcement board: stores announcements and drives their lifecycle.

use chrono::{DateTime, Utc};
use shared::pagination::{paginate, Page, PageRequest, PaginationError};
use shared::search::SearchQuery;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::{
    Announcement, AnnouncementPatch, AnnouncementQuery, AnnouncementStatus,
    CreateAnnouncementRequest, ResolvedAudience, SortDirection, SortField,
};

#[derive(Debug, Error)]
pub enum AnnouncementError {
    #[error("Announcement not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Announcement {0} is completed and cannot be sent")]
    NotSendable(String),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// A status change made by the schedule sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub id: String,
    pub title: String,
    pub from: AnnouncementStatus,
    pub to: AnnouncementStatus,
}

/// Announcement counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub draft: usize,
    pub scheduled: usize,
    pub active: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.draft + self.scheduled + self.active + self.completed
    }
}

/// In-memory announcement collection, kept in creation order.
#[derive(Debug, Default)]
pub struct AnnouncementBoard {
    announcements: Vec<Announcement>,
}

impl AnnouncementBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads pre-built announcements, e.g. demo data.
    pub fn insert_seeded(&mut self, announcements: impl IntoIterator<Item = Announcement>) {
        for announcement in announcements {
            if self.index_of(&announcement.id).is_none() {
                self.announcements.push(announcement);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.announcements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Announcement> {
        self.announcements.iter().find(|a| a.id == id)
    }

    /// Validates and stores a new announcement.
    pub fn create(
        &mut self,
        request: CreateAnnouncementRequest,
        now: DateTime<Utc>,
    ) -> Result<Announcement, AnnouncementError> {
        request.validate()?;

        let announcement = Announcement::from_request(Uuid::new_v4().to_string(), request, now);
        info!(
            announcement_id = %announcement.id,
            status = %announcement.status,
            "Announcement created"
        );
        self.announcements.push(announcement.clone());
        Ok(announcement)
    }

    /// Merges a patch, rejecting it if the merged dates are out of order.
    pub fn update(
        &mut self,
        id: &str,
        patch: AnnouncementPatch,
        now: DateTime<Utc>,
    ) -> Result<Announcement, AnnouncementError> {
        patch.validate()?;
        let index = self
            .index_of(id)
            .ok_or_else(|| AnnouncementError::NotFound(id.to_string()))?;

        let mut merged = self.announcements[index].clone();
        merged.apply(patch, now);
        if let Err(error) = merged.check_dates() {
            let mut errors = ValidationErrors::new();
            errors.add("expiration_date", error);
            return Err(AnnouncementError::Validation(errors));
        }

        self.announcements[index] = merged.clone();
        info!(announcement_id = %id, "Announcement updated");
        Ok(merged)
    }

    pub fn delete(&mut self, id: &str) -> Result<Announcement, AnnouncementError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| AnnouncementError::NotFound(id.to_string()))?;
        let removed = self.announcements.remove(index);
        info!(announcement_id = %id, "Announcement deleted");
        Ok(removed)
    }

    /// Deletes every listed announcement that exists; unknown ids are skipped.
    /// Returns the number deleted.
    pub fn delete_many(&mut self, ids: &[String]) -> usize {
        let before = self.announcements.len();
        self.announcements.retain(|a| !ids.contains(&a.id));
        let deleted = before - self.announcements.len();
        info!(requested = ids.len(), deleted, "Announcements bulk deleted");
        deleted
    }

    /// Filters, sorts and pages the board.
    pub fn list(
        &self,
        query: &AnnouncementQuery,
        default_per_page: usize,
        max_per_page: usize,
    ) -> Result<Page<Announcement>, AnnouncementError> {
        let request =
            PageRequest::from_query(query.page, query.per_page, default_per_page, max_per_page)?;
        let search = SearchQuery::from_optional(query.search.as_deref());

        let mut matching: Vec<Announcement> = self
            .announcements
            .iter()
            .filter(|a| query.statuses.is_empty() || query.statuses.contains(&a.status))
            .filter(|a| search.matches_any(&[a.title.as_str(), a.content.as_str()]))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_field);
            match query.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        debug!(
            total = matching.len(),
            page = request.page(),
            "Listing announcements"
        );
        Ok(paginate(matching, request))
    }

    /// Records a send to `audience`.
    ///
    /// Drafts and scheduled announcements become active; completed ones are
    /// rejected.
    pub fn mark_sent(
        &mut self,
        id: &str,
        audience: &ResolvedAudience,
        now: DateTime<Utc>,
    ) -> Result<Announcement, AnnouncementError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| AnnouncementError::NotFound(id.to_string()))?;
        let announcement = &mut self.announcements[index];
        if !announcement.status.is_sendable() {
            return Err(AnnouncementError::NotSendable(id.to_string()));
        }

        announcement.status = AnnouncementStatus::Active;
        announcement.last_sent_at = Some(now);
        announcement.send_count += 1;
        announcement.updated_at = now;

        info!(
            announcement_id = %id,
            audience = %audience.description,
            recipients = audience.recipient_count(),
            "Announcement sent"
        );
        Ok(announcement.clone())
    }

    /// Moves scheduled announcements whose publish date has passed to active,
    /// and active announcements whose expiration date has passed to completed.
    pub fn apply_schedule(&mut self, now: DateTime<Utc>) -> Vec<StatusTransition> {
        let mut transitions = Vec::new();

        for announcement in &mut self.announcements {
            let next = match announcement.status {
                AnnouncementStatus::Scheduled
                    if announcement.publish_date.is_some_and(|p| p <= now) =>
                {
                    if announcement.expiration_date.is_some_and(|e| e <= now) {
                        AnnouncementStatus::Completed
                    } else {
                        AnnouncementStatus::Active
                    }
                }
                AnnouncementStatus::Active
                    if announcement.expiration_date.is_some_and(|e| e <= now) =>
                {
                    AnnouncementStatus::Completed
                }
                _ => continue,
            };

            transitions.push(StatusTransition {
                id: announcement.id.clone(),
                title: announcement.title.clone(),
                from: announcement.status,
                to: next,
            });
            announcement.status = next;
            announcement.updated_at = now;
        }

        if !transitions.is_empty() {
            info!(count = transitions.len(), "Announcement schedule applied");
        }
        transitions
    }

    pub fn counts_by_status(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for announcement in &self.announcements {
            match announcement.status {
                AnnouncementStatus::Draft => counts.draft += 1,
                AnnouncementStatus::Scheduled => counts.scheduled += 1,
                AnnouncementStatus::Active => counts.active += 1,
                AnnouncementStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.announcements.iter().position(|a| a.id == id)
    }
}

fn compare(a: &Announcement, b: &Announcement, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}
