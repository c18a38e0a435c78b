//! Group domain models for organizing clients.

use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use validator::Validate;

use super::client::Client;

/// A named collection of clients.
///
/// `clients` is a read-time view: the directory store fills it from the live
/// client collection every time a group snapshot is handed out, so it always
/// equals the set of clients whose `group_id` is this group's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub clients: Vec<Client>,
    /// Transient UI flag; mirrors membership in the selected-groups list.
    #[serde(default)]
    pub selected: bool,
}

impl Group {
    pub fn client_ids(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

impl CreateGroupRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Partial update for a group.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
}

impl GroupPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}
