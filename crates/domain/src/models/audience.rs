//! Announcement audience targeting.

use serde::{Deserialize, Serialize};

/// Who an announcement is sent to, decided at send time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum AudienceTarget {
    /// A single client.
    Client(String),
    /// Every current member of a group.
    Group(String),
    /// Whatever is selected when the announcement is sent.
    Selection,
    /// Every client in the directory.
    #[default]
    All,
}

/// An audience target resolved against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAudience {
    /// Human-readable description, e.g. `3 clients and 1 group`.
    pub description: String,
    /// Recipient client ids in directory order, without duplicates.
    pub client_ids: Vec<String>,
}

impl ResolvedAudience {
    pub fn recipient_count(&self) -> usize {
        self.client_ids.len()
    }
}

/// Formats `count` with a noun, pluralized with a trailing `s`.
pub(crate) fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
