//! Bounded in-memory activity log.

use chrono::{DateTime, Utc};
use shared::pagination::{paginate, Page, PageRequest};
use shared::search::SearchQuery;
use std::collections::VecDeque;

use crate::models::{ActivityEntry, ActivityLevel};
use crate::services::events::{StoreChange, StoreEvent};

/// Default number of entries retained.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 500;

/// Ring of the most recent activity entries; the oldest entry is dropped
/// once capacity is reached.
#[derive(Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry stamped with the current time.
    pub fn record(
        &mut self,
        level: ActivityLevel,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> &ActivityEntry {
        self.record_at(Utc::now(), level, message, source)
    }

    pub fn record_at(
        &mut self,
        timestamp: DateTime<Utc>,
        level: ActivityLevel,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> &ActivityEntry {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let entry = ActivityEntry {
            id: self.next_id,
            timestamp,
            level,
            message: message.into(),
            source: source.into(),
        };
        self.next_id += 1;
        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Records a directory change. Selection changes are not logged.
    pub fn record_event(&mut self, event: &StoreEvent) -> Option<&ActivityEntry> {
        if event.change.is_selection() {
            return None;
        }
        let level = match event.change {
            StoreChange::ClientDeleted { .. } | StoreChange::GroupDeleted { .. } => {
                ActivityLevel::Warning
            }
            _ => ActivityLevel::Info,
        };
        Some(self.record_at(event.at, level, event.change.message(), "directory"))
    }

    /// Newest-first listing, optionally filtered by level and message text.
    pub fn list(
        &self,
        level: Option<ActivityLevel>,
        search: Option<&str>,
        request: PageRequest,
    ) -> Page<ActivityEntry> {
        let search = SearchQuery::from_optional(search);
        let matching = self
            .entries
            .iter()
            .rev()
            .filter(|e| level.map_or(true, |l| e.level == l))
            .filter(|e| search.matches_any(&[e.message.as_str(), e.source.as_str()]))
            .cloned()
            .collect();
        paginate(matching, request)
    }
}
