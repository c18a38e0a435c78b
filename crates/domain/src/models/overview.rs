//! Fleet overview model backing the dashboard.

use serde::Serialize;

/// Client counts per status plus grouping totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total_clients: usize,
    pub connected: usize,
    pub warning: usize,
    pub error: usize,
    pub inactive: usize,
    pub grouped: usize,
    pub ungrouped: usize,
    pub groups: usize,
}

impl StatusSummary {
    /// Clients in warning or error state.
    pub fn needing_attention(&self) -> usize {
        self.warning + self.error
    }
}
