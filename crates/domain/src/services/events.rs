//! Change events published by the directory store.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a directory mutation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoreChange {
    ClientAdded {
        client_id: String,
        name: String,
    },
    ClientUpdated {
        client_id: String,
        name: String,
    },
    ClientDeleted {
        client_id: String,
        name: String,
    },
    GroupAdded {
        group_id: String,
        name: String,
    },
    GroupUpdated {
        group_id: String,
        name: String,
    },
    GroupDeleted {
        group_id: String,
        name: String,
        /// Clients that lost their group reference.
        ungrouped: Vec<String>,
    },
    ClientMoved {
        client_id: String,
        from_group: Option<String>,
        to_group: String,
    },
    ClientRemovedFromGroup {
        client_id: String,
        group_id: String,
    },
    SelectionChanged {
        selected_clients: usize,
        selected_groups: usize,
    },
}

impl StoreChange {
    /// Short machine-readable name, used for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreChange::ClientAdded { .. } => "client_added",
            StoreChange::ClientUpdated { .. } => "client_updated",
            StoreChange::ClientDeleted { .. } => "client_deleted",
            StoreChange::GroupAdded { .. } => "group_added",
            StoreChange::GroupUpdated { .. } => "group_updated",
            StoreChange::GroupDeleted { .. } => "group_deleted",
            StoreChange::ClientMoved { .. } => "client_moved",
            StoreChange::ClientRemovedFromGroup { .. } => "client_removed_from_group",
            StoreChange::SelectionChanged { .. } => "selection_changed",
        }
    }

    /// Selection changes are transient UI state and stay out of the activity log.
    pub fn is_selection(&self) -> bool {
        matches!(self, StoreChange::SelectionChanged { .. })
    }

    /// Confirmation text shown to the operator.
    pub fn message(&self) -> String {
        match self {
            StoreChange::ClientAdded { name, .. } => {
                format!("Client \"{}\" added successfully", name)
            }
            StoreChange::ClientUpdated { .. } => "Client updated successfully".to_string(),
            StoreChange::ClientDeleted { name, .. } => {
                format!("Client \"{}\" deleted successfully", name)
            }
            StoreChange::GroupAdded { name, .. } => {
                format!("Group \"{}\" created successfully", name)
            }
            StoreChange::GroupUpdated { .. } => "Group updated successfully".to_string(),
            StoreChange::GroupDeleted { name, .. } => {
                format!("Group \"{}\" deleted successfully", name)
            }
            StoreChange::ClientMoved { .. } => "Client added to group successfully".to_string(),
            StoreChange::ClientRemovedFromGroup { .. } => {
                "Client removed from group successfully".to_string()
            }
            StoreChange::SelectionChanged {
                selected_clients,
                selected_groups,
            } => format!(
                "Selection changed: {} clients, {} groups",
                selected_clients, selected_groups
            ),
        }
    }
}

/// A published change, stamped with the store revision it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub revision: u64,
    pub at: DateTime<Utc>,
    pub change: StoreChange,
}
