//! Client (signage display device) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_network_address, validate_not_blank};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use super::patch::FieldUpdate;

/// Connection health of a client as last reported by monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Connected,
    Warning,
    Error,
    #[default]
    Inactive,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 4] = [
        ClientStatus::Connected,
        ClientStatus::Warning,
        ClientStatus::Error,
        ClientStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Connected => "connected",
            ClientStatus::Warning => "warning",
            ClientStatus::Error => "error",
            ClientStatus::Inactive => "inactive",
        }
    }

    /// Returns true if the client needs operator attention.
    pub fn needs_attention(&self) -> bool {
        matches!(self, ClientStatus::Warning | ClientStatus::Error)
    }
}

impl FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connected" => Ok(ClientStatus::Connected),
            "warning" => Ok(ClientStatus::Warning),
            "error" => Ok(ClientStatus::Error),
            "inactive" => Ok(ClientStatus::Inactive),
            _ => Err(format!("Invalid client status: {}", s)),
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A signage display device tracked by the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub status: ClientStatus,
    pub last_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Transient UI flag; mirrors membership in the selected-clients list.
    #[serde(default)]
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
}

impl Client {
    /// Builds a new, unselected client from a creation request.
    pub fn from_request(id: String, request: CreateClientRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: request.name,
            status: request.status,
            last_seen: now,
            group_id: request.group_id,
            selected: false,
            network_address: request.network_address,
            location: request.location,
            contact_person: request.contact_person,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }

    pub fn in_group(&self, group_id: &str) -> bool {
        self.group_id.as_deref() == Some(group_id)
    }

    /// Merges a patch into this client.
    ///
    /// Group reference checks belong to the directory store; this only copies fields.
    pub fn apply(&mut self, patch: ClientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(last_seen) = patch.last_seen {
            self.last_seen = last_seen;
        }
        patch.group_id.apply_to(&mut self.group_id);
        patch.network_address.apply_to(&mut self.network_address);
        patch.location.apply_to(&mut self.location);
        patch.contact_person.apply_to(&mut self.contact_person);
    }
}

/// Request payload for adding a client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Client name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[serde(default)]
    pub status: ClientStatus,

    pub group_id: Option<String>,

    #[validate(custom(function = "validate_network_address"))]
    pub network_address: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 100, message = "Contact person must be at most 100 characters"))]
    pub contact_person: Option<String>,
}

impl CreateClientRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ClientStatus) -> Self {
        self.status = status;
        self
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

/// Partial update for a client.
///
/// Selection is deliberately absent: it only changes through the selection
/// operations so the flag and the selected-id list stay in lockstep.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_client_patch"))]
pub struct ClientPatch {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Client name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,

    pub status: Option<ClientStatus>,

    pub last_seen: Option<DateTime<Utc>>,

    #[serde(default)]
    pub group_id: FieldUpdate<String>,

    #[serde(default)]
    pub network_address: FieldUpdate<String>,

    #[serde(default)]
    pub location: FieldUpdate<String>,

    #[serde(default)]
    pub contact_person: FieldUpdate<String>,
}

impl ClientPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn status(status: ClientStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

fn validate_client_patch(patch: &ClientPatch) -> Result<(), ValidationError> {
    if let Some(address) = patch.network_address.as_set() {
        validate_network_address(address)?;
    }
    if patch.location.as_set().is_some_and(|l| l.chars().count() > 200) {
        let mut err = ValidationError::new("length");
        err.message = Some("Location must be at most 200 characters".into());
        return Err(err);
    }
    if patch
        .contact_person
        .as_set()
        .is_some_and(|c| c.chars().count() > 100)
    {
        let mut err = ValidationError::new("length");
        err.message = Some("Contact person must be at most 100 characters".into());
        return Err(err);
    }
    Ok(())
}
