//! Directory store: the single source of truth for clients, groups and selection.
//!
//! Group membership is held only as the `group_id` back-reference on each
//! client. Group snapshots get their `clients` list computed on read, so a
//! group's member list can never drift from the back-references.
//!
//! The selected flag on each entity and the selected-id lists are changed
//! together by the private `mark_*` helpers; nothing else writes either one.
//!
//! Every mutation that changes state bumps the revision and publishes one
//! [`StoreEvent`]. Operations on unknown ids change nothing, publish nothing
//! and return a [`DirectoryError`] that callers are free to ignore.

use chrono::Utc;
use serde::Serialize;
use shared::search::SearchQuery;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::audience::counted;
use crate::models::{
    AudienceTarget, Client, ClientPatch, ClientStatus, CreateClientRequest, CreateGroupRequest,
    FieldUpdate, Group, GroupPatch, ResolvedAudience, StatusSummary,
};
use crate::services::events::{StoreChange, StoreEvent};

/// Default capacity of the change-event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Errors reported by directory operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Client {client_id} is not in group {group_id}")]
    ClientNotInGroup { client_id: String, group_id: String },
}

/// Stored group; members are derived from client back-references.
#[derive(Debug, Clone)]
struct GroupRecord {
    id: String,
    name: String,
    selected: bool,
}

/// A consistent copy of the whole directory at one revision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    pub revision: u64,
    pub clients: Vec<Client>,
    pub groups: Vec<Group>,
    pub selected_clients: Vec<String>,
    pub selected_groups: Vec<String>,
}

/// In-memory directory of clients and groups.
///
/// The store is a plain single-writer value. Share it behind a lock when
/// several tasks need it; observers use [`DirectoryStore::subscribe`].
#[derive(Debug)]
pub struct DirectoryStore {
    clients: Vec<Client>,
    groups: Vec<GroupRecord>,
    selected_clients: Vec<String>,
    selected_groups: Vec<String>,
    revision: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_event_buffer(DEFAULT_EVENT_BUFFER)
    }

    /// Creates an empty store whose event channel holds `capacity` events.
    pub fn with_event_buffer(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            clients: Vec::new(),
            groups: Vec::new(),
            selected_clients: Vec::new(),
            selected_groups: Vec::new(),
            revision: 0,
            events,
        }
    }

    /// Initializes a store from existing collections.
    ///
    /// Incoming `Group::clients` lists are ignored; membership comes from the
    /// clients' `group_id`. Dangling group references are cleared, duplicate
    /// ids are dropped and the selected lists are rebuilt from the flags.
    pub fn from_parts(clients: Vec<Client>, groups: Vec<Group>, event_buffer: usize) -> Self {
        let mut store = Self::with_event_buffer(event_buffer);

        for group in groups {
            if store.group_index(&group.id).is_some() {
                warn!(group_id = %group.id, "Skipping duplicate group id");
                continue;
            }
            if group.selected {
                store.selected_groups.push(group.id.clone());
            }
            store.groups.push(GroupRecord {
                id: group.id,
                name: group.name,
                selected: group.selected,
            });
        }

        for mut client in clients {
            if store.client_index(&client.id).is_some() {
                warn!(client_id = %client.id, "Skipping duplicate client id");
                continue;
            }
            if let Some(group_id) = client.group_id.as_deref() {
                if store.group_index(group_id).is_none() {
                    warn!(
                        client_id = %client.id,
                        group_id = %group_id,
                        "Clearing reference to unknown group"
                    );
                    client.group_id = None;
                }
            }
            if client.selected {
                store.selected_clients.push(client.id.clone());
            }
            store.clients.push(client);
        }

        debug!(
            clients = store.clients.len(),
            groups = store.groups.len(),
            "Directory initialized"
        );
        store
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Subscribes to change events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Number of state-changing mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn publish(&mut self, change: StoreChange) {
        self.revision += 1;
        info!(
            revision = self.revision,
            kind = change.kind(),
            "{}",
            change.message()
        );
        let event = StoreEvent {
            revision: self.revision,
            at: Utc::now(),
            change,
        };
        // No subscribers is fine; the event is simply dropped.
        let _ = self.events.send(event);
    }

    fn publish_selection(&mut self) {
        self.publish(StoreChange::SelectionChanged {
            selected_clients: self.selected_clients.len(),
            selected_groups: self.selected_groups.len(),
        });
    }

    // ------------------------------------------------------------------
    // Client operations
    // ------------------------------------------------------------------

    /// Adds a client with a fresh id and a `last_seen` of now.
    pub fn add_client(&mut self, request: CreateClientRequest) -> Result<Client, DirectoryError> {
        if let Some(group_id) = request.group_id.as_deref() {
            self.require_group(group_id)?;
        }

        let client = Client::from_request(new_id(), request, Utc::now());
        self.clients.push(client.clone());
        self.publish(StoreChange::ClientAdded {
            client_id: client.id.clone(),
            name: client.name.clone(),
        });
        Ok(client)
    }

    /// Merges a patch into an existing client.
    pub fn update_client(
        &mut self,
        id: &str,
        patch: ClientPatch,
    ) -> Result<Client, DirectoryError> {
        let index = self
            .client_index(id)
            .ok_or_else(|| DirectoryError::ClientNotFound(id.to_string()))?;
        if let FieldUpdate::Set(group_id) = &patch.group_id {
            self.require_group(group_id)?;
        }

        let client = &mut self.clients[index];
        client.apply(patch);
        let updated = client.clone();

        self.publish(StoreChange::ClientUpdated {
            client_id: updated.id.clone(),
            name: updated.name.clone(),
        });
        Ok(updated)
    }

    /// Removes a client, its group membership and its selection.
    pub fn delete_client(&mut self, id: &str) -> Result<Client, DirectoryError> {
        let index = self
            .client_index(id)
            .ok_or_else(|| DirectoryError::ClientNotFound(id.to_string()))?;

        let removed = self.clients.remove(index);
        self.selected_clients.retain(|selected| selected != id);

        self.publish(StoreChange::ClientDeleted {
            client_id: removed.id.clone(),
            name: removed.name.clone(),
        });
        Ok(removed)
    }

    /// Deletes every listed client that exists; unknown ids are skipped.
    ///
    /// Each removal cascades like [`DirectoryStore::delete_client`]. Returns
    /// the removed clients in request order.
    pub fn delete_clients(&mut self, ids: &[String]) -> Vec<Client> {
        ids.iter()
            .filter_map(|id| self.delete_client(id).ok())
            .collect()
    }

    /// Deletes the selected clients, then clears every selection.
    pub fn delete_selected_clients(&mut self) -> Vec<Client> {
        let selected = self.selected_clients.clone();
        let removed = self.delete_clients(&selected);
        self.clear_all_selections();

        info!(deleted = removed.len(), "Deleted selected clients");
        removed
    }

    /// Sets whether a client is selected. Repeating a call changes nothing.
    pub fn select_client(&mut self, id: &str, selected: bool) -> Result<(), DirectoryError> {
        let index = self
            .client_index(id)
            .ok_or_else(|| DirectoryError::ClientNotFound(id.to_string()))?;

        if self.mark_client(index, selected) {
            self.publish_selection();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Group operations
    // ------------------------------------------------------------------

    /// Adds an empty, unselected group with a fresh id.
    pub fn add_group(&mut self, request: CreateGroupRequest) -> Group {
        let record = GroupRecord {
            id: new_id(),
            name: request.name,
            selected: false,
        };
        self.groups.push(record.clone());
        self.publish(StoreChange::GroupAdded {
            group_id: record.id.clone(),
            name: record.name.clone(),
        });
        self.group_view(&record)
    }

    pub fn update_group(&mut self, id: &str, patch: GroupPatch) -> Result<Group, DirectoryError> {
        let index = self
            .group_index(id)
            .ok_or_else(|| DirectoryError::GroupNotFound(id.to_string()))?;

        let record = &mut self.groups[index];
        if let Some(name) = patch.name {
            record.name = name;
        }
        let record = record.clone();

        self.publish(StoreChange::GroupUpdated {
            group_id: record.id.clone(),
            name: record.name.clone(),
        });
        Ok(self.group_view(&record))
    }

    /// Deletes a group. Its clients stay in the directory, ungrouped.
    ///
    /// Returns the group as it was just before deletion.
    pub fn delete_group(&mut self, id: &str) -> Result<Group, DirectoryError> {
        let index = self
            .group_index(id)
            .ok_or_else(|| DirectoryError::GroupNotFound(id.to_string()))?;

        let before = self.group_view(&self.groups[index]);
        let record = self.groups.remove(index);

        let mut ungrouped = Vec::new();
        for client in self.clients.iter_mut().filter(|c| c.in_group(id)) {
            client.group_id = None;
            ungrouped.push(client.id.clone());
        }
        self.selected_groups.retain(|selected| selected != id);

        self.publish(StoreChange::GroupDeleted {
            group_id: record.id,
            name: record.name,
            ungrouped,
        });
        Ok(before)
    }

    /// Sets whether a group is selected. Repeating a call changes nothing.
    pub fn select_group(&mut self, id: &str, selected: bool) -> Result<(), DirectoryError> {
        let index = self
            .group_index(id)
            .ok_or_else(|| DirectoryError::GroupNotFound(id.to_string()))?;

        if self.mark_group(index, selected) {
            self.publish_selection();
        }
        Ok(())
    }

    /// Moves a client into a group, leaving any previous group.
    ///
    /// Adding a client to the group it is already in is a no-op.
    pub fn add_client_to_group(
        &mut self,
        client_id: &str,
        group_id: &str,
    ) -> Result<Client, DirectoryError> {
        let index = self
            .client_index(client_id)
            .ok_or_else(|| DirectoryError::ClientNotFound(client_id.to_string()))?;
        self.require_group(group_id)?;

        let client = &mut self.clients[index];
        if client.in_group(group_id) {
            return Ok(client.clone());
        }
        let from_group = client.group_id.replace(group_id.to_string());
        let moved = client.clone();

        self.publish(StoreChange::ClientMoved {
            client_id: moved.id.clone(),
            from_group,
            to_group: group_id.to_string(),
        });
        Ok(moved)
    }

    /// Takes a client out of the named group.
    pub fn remove_client_from_group(
        &mut self,
        client_id: &str,
        group_id: &str,
    ) -> Result<Client, DirectoryError> {
        let index = self
            .client_index(client_id)
            .ok_or_else(|| DirectoryError::ClientNotFound(client_id.to_string()))?;
        self.require_group(group_id)?;

        let client = &mut self.clients[index];
        if !client.in_group(group_id) {
            return Err(DirectoryError::ClientNotInGroup {
                client_id: client_id.to_string(),
                group_id: group_id.to_string(),
            });
        }
        client.group_id = None;
        let removed = client.clone();

        self.publish(StoreChange::ClientRemovedFromGroup {
            client_id: removed.id.clone(),
            group_id: group_id.to_string(),
        });
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Selection operations
    // ------------------------------------------------------------------

    /// Empties both selected lists and clears every selected flag.
    pub fn clear_all_selections(&mut self) {
        let mut changed = false;
        for index in 0..self.clients.len() {
            changed |= self.mark_client(index, false);
        }
        for index in 0..self.groups.len() {
            changed |= self.mark_group(index, false);
        }
        if changed {
            self.publish_selection();
        }
    }

    /// Selects every client. Returns the size of the client selection.
    pub fn select_all_clients(&mut self) -> usize {
        let mut changed = false;
        for index in 0..self.clients.len() {
            changed |= self.mark_client(index, true);
        }
        if changed {
            self.publish_selection();
        }
        self.selected_clients.len()
    }

    /// Adds every member of a group to the client selection.
    ///
    /// Clients outside the group keep their selection. Returns how many
    /// clients were newly selected.
    pub fn select_all_in_group(&mut self, group_id: &str) -> Result<usize, DirectoryError> {
        self.require_group(group_id)?;

        let members: Vec<usize> = self
            .clients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.in_group(group_id))
            .map(|(index, _)| index)
            .collect();

        let newly_selected = members
            .into_iter()
            .filter(|&index| self.mark_client(index, true))
            .count();
        if newly_selected > 0 {
            self.publish_selection();
        }
        Ok(newly_selected)
    }

    /// Sets one client's flag and list membership together.
    /// Returns true if anything changed.
    fn mark_client(&mut self, index: usize, selected: bool) -> bool {
        let client = &mut self.clients[index];
        let listed = self.selected_clients.contains(&client.id);
        let changed = client.selected != selected || listed != selected;

        client.selected = selected;
        if selected && !listed {
            self.selected_clients.push(client.id.clone());
        } else if !selected && listed {
            let id = client.id.clone();
            self.selected_clients.retain(|selected| *selected != id);
        }
        changed
    }

    /// Group counterpart of [`Self::mark_client`].
    fn mark_group(&mut self, index: usize, selected: bool) -> bool {
        let group = &mut self.groups[index];
        let listed = self.selected_groups.contains(&group.id);
        let changed = group.selected != selected || listed != selected;

        group.selected = selected;
        if selected && !listed {
            self.selected_groups.push(group.id.clone());
        } else if !selected && listed {
            let id = group.id.clone();
            self.selected_groups.retain(|selected| *selected != id);
        }
        changed
    }

    // ------------------------------------------------------------------
    // Filtering and reads
    // ------------------------------------------------------------------

    /// Clients whose name or id contains `query`, ignoring case.
    ///
    /// An empty query returns every client in store order.
    pub fn filter_clients(&self, query: &str) -> Vec<Client> {
        let query = SearchQuery::new(query);
        self.clients
            .iter()
            .filter(|c| query.matches_any(&[c.name.as_str(), c.id.as_str()]))
            .cloned()
            .collect()
    }

    /// Groups whose name contains `query`, ignoring case.
    pub fn filter_groups(&self, query: &str) -> Vec<Group> {
        let query = SearchQuery::new(query);
        self.groups
            .iter()
            .filter(|g| query.matches(&g.name))
            .map(|g| self.group_view(g))
            .collect()
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn groups(&self) -> Vec<Group> {
        self.groups.iter().map(|g| self.group_view(g)).collect()
    }

    pub fn selected_clients(&self) -> &[String] {
        &self.selected_clients
    }

    pub fn selected_groups(&self) -> &[String] {
        &self.selected_groups
    }

    pub fn get_client(&self, id: &str) -> Option<Client> {
        self.clients.iter().find(|c| c.id == id).cloned()
    }

    pub fn get_group(&self, id: &str) -> Option<Group> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| self.group_view(g))
    }

    /// Current members of a group; empty for an unknown group.
    pub fn get_clients_in_group(&self, group_id: &str) -> Vec<Client> {
        self.clients
            .iter()
            .filter(|c| c.in_group(group_id))
            .cloned()
            .collect()
    }

    /// Map of every group id to its current members, computed from the
    /// live client collection. Groups without members map to an empty list.
    pub fn get_grouped_clients(&self) -> BTreeMap<String, Vec<Client>> {
        self.groups
            .iter()
            .map(|g| (g.id.clone(), self.get_clients_in_group(&g.id)))
            .collect()
    }

    pub fn get_ungrouped_clients(&self) -> Vec<Client> {
        self.clients
            .iter()
            .filter(|c| !c.is_grouped())
            .cloned()
            .collect()
    }

    /// Copies the whole directory at the current revision.
    pub fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            revision: self.revision,
            clients: self.clients.clone(),
            groups: self.groups(),
            selected_clients: self.selected_clients.clone(),
            selected_groups: self.selected_groups.clone(),
        }
    }

    /// Client counts per status and grouping.
    pub fn status_summary(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total_clients: self.clients.len(),
            groups: self.groups.len(),
            ..Default::default()
        };
        for client in &self.clients {
            match client.status {
                ClientStatus::Connected => summary.connected += 1,
                ClientStatus::Warning => summary.warning += 1,
                ClientStatus::Error => summary.error += 1,
                ClientStatus::Inactive => summary.inactive += 1,
            }
            if client.is_grouped() {
                summary.grouped += 1;
            } else {
                summary.ungrouped += 1;
            }
        }
        summary
    }

    /// Resolves an announcement audience against the current directory.
    pub fn resolve_audience(
        &self,
        target: &AudienceTarget,
    ) -> Result<ResolvedAudience, DirectoryError> {
        match target {
            AudienceTarget::Client(id) => {
                let client = self
                    .clients
                    .iter()
                    .find(|c| &c.id == id)
                    .ok_or_else(|| DirectoryError::ClientNotFound(id.clone()))?;
                Ok(ResolvedAudience {
                    description: format!("client {}", client.name),
                    client_ids: vec![client.id.clone()],
                })
            }
            AudienceTarget::Group(id) => {
                let group = self
                    .groups
                    .iter()
                    .find(|g| &g.id == id)
                    .ok_or_else(|| DirectoryError::GroupNotFound(id.clone()))?;
                Ok(ResolvedAudience {
                    description: format!("group {}", group.name),
                    client_ids: self.member_ids(|c| c.in_group(id)),
                })
            }
            AudienceTarget::Selection
                if !self.selected_clients.is_empty() || !self.selected_groups.is_empty() =>
            {
                let mut parts = Vec::new();
                if !self.selected_clients.is_empty() {
                    parts.push(counted(self.selected_clients.len(), "client"));
                }
                if !self.selected_groups.is_empty() {
                    parts.push(counted(self.selected_groups.len(), "group"));
                }

                let clients: HashSet<&str> =
                    self.selected_clients.iter().map(String::as_str).collect();
                let groups: HashSet<&str> =
                    self.selected_groups.iter().map(String::as_str).collect();
                let client_ids = self.member_ids(|c| {
                    clients.contains(c.id.as_str())
                        || c.group_id.as_deref().is_some_and(|g| groups.contains(g))
                });

                Ok(ResolvedAudience {
                    description: parts.join(" and "),
                    client_ids,
                })
            }
            AudienceTarget::Selection | AudienceTarget::All => Ok(ResolvedAudience {
                description: "all clients".to_string(),
                client_ids: self.member_ids(|_| true),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn client_index(&self, id: &str) -> Option<usize> {
        self.clients.iter().position(|c| c.id == id)
    }

    fn group_index(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    fn require_group(&self, id: &str) -> Result<(), DirectoryError> {
        self.group_index(id)
            .map(|_| ())
            .ok_or_else(|| DirectoryError::GroupNotFound(id.to_string()))
    }

    fn member_ids(&self, include: impl Fn(&Client) -> bool) -> Vec<String> {
        self.clients
            .iter()
            .filter(|c| include(c))
            .map(|c| c.id.clone())
            .collect()
    }

    fn group_view(&self, record: &GroupRecord) -> Group {
        Group {
            id: record.id.clone(),
            name: record.name.clone(),
            clients: self.get_clients_in_group(&record.id),
            selected: record.selected,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientStatus;
    use fake::{faker::lorem::en::Word, Fake};
    use tokio::sync::broadcast::error::TryRecvError;

    fn client(id: &str, name: &str, group_id: Option<&str>) -> Client {
        Client {
            id: id.to_string(),
            name: name.to_string(),
            status: ClientStatus::Connected,
            last_seen: Utc::now(),
            group_id: group_id.map(str::to_string),
            selected: false,
            network_address: None,
            location: None,
            contact_person: None,
        }
    }

    fn group(id: &str, name: &str) -> Group {
        Group {
            id: id.to_string(),
            name: name.to_string(),
            clients: vec![],
            selected: false,
        }
    }

    /// One grouped client in "Room A", as in the console's first-run state.
    fn room_a() -> DirectoryStore {
        DirectoryStore::from_parts(
            vec![client("1", "LB467-1", Some("g1"))],
            vec![group("g1", "Room A")],
            16,
        )
    }

    fn fleet() -> DirectoryStore {
        DirectoryStore::from_parts(
            vec![
                client("1", "LB467-1", Some("g1")),
                client("2", "LB467-2", Some("g1")),
                client("3", "ComputerLab01", Some("g2")),
                client("4", "ABCDEF", None),
            ],
            vec![group("g1", "Room A"), group("g2", "Lab Monitors")],
            16,
        )
    }

    fn ids(clients: &[Client]) -> Vec<&str> {
        clients.iter().map(|c| c.id.as_str()).collect()
    }

    /// Asserts cache consistency, the single-owner rule and the selection mirror.
    fn assert_invariants(store: &DirectoryStore) {
        let group_ids: HashSet<&str> = store.groups.iter().map(|g| g.id.as_str()).collect();
        for client in store.clients() {
            if let Some(group_id) = client.group_id.as_deref() {
                assert!(group_ids.contains(group_id), "dangling group {}", group_id);
            }
            assert_eq!(
                client.selected,
                store.selected_clients().contains(&client.id),
                "selection mirror broken for client {}",
                client.id
            );
        }
        for group in store.groups() {
            let cached: HashSet<&str> = group.client_ids().into_iter().collect();
            let live: HashSet<&str> = store
                .clients()
                .iter()
                .filter(|c| c.in_group(&group.id))
                .map(|c| c.id.as_str())
                .collect();
            assert_eq!(cached, live, "member list out of sync for {}", group.id);
            assert_eq!(group.selected, store.selected_groups().contains(&group.id));
        }

        let unique: HashSet<&String> = store.selected_clients().iter().collect();
        assert_eq!(unique.len(), store.selected_clients().len());
        for id in store.selected_clients() {
            assert!(store.get_client(id).is_some());
        }
        for id in store.selected_groups() {
            assert!(store.get_group(id).is_some());
        }
    }

    #[test]
    fn test_initialization_populates_group_members() {
        let store = room_a();
        let members = store.get_clients_in_group("g1");
        assert_eq!(ids(&members), vec!["1"]);
        assert_eq!(ids(&store.get_group("g1").unwrap().clients), vec!["1"]);
        assert_invariants(&store);
    }

    #[test]
    fn test_initialization_clears_dangling_group_reference() {
        let store = DirectoryStore::from_parts(
            vec![client("1", "LB467-1", Some("missing"))],
            vec![],
            16,
        );
        assert!(store.get_client("1").unwrap().group_id.is_none());
        assert_invariants(&store);
    }

    #[test]
    fn test_initialization_rebuilds_selection_and_drops_duplicates() {
        let mut selected = client("1", "LB467-1", None);
        selected.selected = true;
        let store = DirectoryStore::from_parts(
            vec![selected, client("1", "Duplicate", None)],
            vec![],
            16,
        );
        assert_eq!(store.clients().len(), 1);
        assert_eq!(store.selected_clients(), ["1".to_string()]);
        assert_invariants(&store);
    }

    #[test]
    fn test_add_client_assigns_id_and_joins_group() {
        let mut store = room_a();
        let added = store
            .add_client(CreateClientRequest::named("LB467-2").in_group("g1"))
            .unwrap();

        assert!(!added.id.is_empty());
        assert_ne!(added.id, "1");
        assert!(!added.selected);
        assert_eq!(store.clients().len(), 2);
        assert_eq!(ids(&store.get_clients_in_group("g1")), vec!["1", added.id.as_str()]);
        assert_eq!(store.revision(), 1);
        assert_invariants(&store);
    }

    #[test]
    fn test_add_client_ids_are_unique() {
        let mut store = DirectoryStore::new();
        let a = store.add_client(CreateClientRequest::named("A")).unwrap();
        let b = store.add_client(CreateClientRequest::named("B")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_add_client_rejects_unknown_group() {
        let mut store = room_a();
        let result = store.add_client(CreateClientRequest::named("Lobby").in_group("nope"));
        assert_eq!(result, Err(DirectoryError::GroupNotFound("nope".to_string())));
        assert_eq!(store.clients().len(), 1);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_update_client_reflected_in_group_view() {
        let mut store = room_a();
        let updated = store
            .update_client("1", ClientPatch::status(ClientStatus::Error))
            .unwrap();
        assert_eq!(updated.status, ClientStatus::Error);

        let group = store.get_group("g1").unwrap();
        assert_eq!(group.clients[0].status, ClientStatus::Error);
        assert_invariants(&store);
    }

    #[test]
    fn test_update_client_can_clear_group() {
        let mut store = room_a();
        let patch = ClientPatch {
            group_id: FieldUpdate::Clear,
            ..Default::default()
        };
        store.update_client("1", patch).unwrap();
        assert!(store.get_clients_in_group("g1").is_empty());
        assert_eq!(ids(&store.get_ungrouped_clients()), vec!["1"]);
        assert_invariants(&store);
    }

    #[test]
    fn test_update_client_unknown_id_is_noop() {
        let mut store = room_a();
        let result = store.update_client("99", ClientPatch::name("Ghost"));
        assert_eq!(result, Err(DirectoryError::ClientNotFound("99".to_string())));
        assert_eq!(store.revision(), 0);
        assert_eq!(store.get_client("1").unwrap().name, "LB467-1");
    }

    #[test]
    fn test_update_client_rejects_unknown_group() {
        let mut store = room_a();
        let patch = ClientPatch {
            group_id: FieldUpdate::Set("nope".to_string()),
            ..Default::default()
        };
        assert!(store.update_client("1", patch).is_err());
        assert!(store.get_client("1").unwrap().in_group("g1"));
    }

    #[test]
    fn test_delete_client_cascades() {
        let mut store = fleet();
        store.select_client("1", true).unwrap();

        let removed = store.delete_client("1").unwrap();
        assert_eq!(removed.name, "LB467-1");
        assert!(store.get_client("1").is_none());
        assert_eq!(ids(&store.get_group("g1").unwrap().clients), vec!["2"]);
        assert!(store.selected_clients().is_empty());
        assert_invariants(&store);
    }

    #[test]
    fn test_delete_client_unknown_id_is_noop() {
        let mut store = fleet();
        let revision = store.revision();
        assert!(store.delete_client("99").is_err());
        assert_eq!(store.clients().len(), 4);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_delete_clients_skips_unknown_ids() {
        let mut store = fleet();
        let revision = store.revision();

        let removed = store.delete_clients(&["3".to_string(), "99".to_string(), "3".to_string()]);
        assert_eq!(ids(&removed), vec!["3"]);
        assert!(store.get_group("g2").unwrap().clients.is_empty());
        assert_eq!(store.clients().len(), 3);
        assert_eq!(store.revision(), revision + 1);
        assert_invariants(&store);
    }

    #[test]
    fn test_delete_selected_clients() {
        let mut store = fleet();
        store.select_client("1", true).unwrap();
        store.select_client("4", true).unwrap();
        store.select_group("g2", true).unwrap();

        let removed = store.delete_selected_clients();
        assert_eq!(ids(&removed), vec!["1", "4"]);
        assert_eq!(ids(store.clients()), vec!["2", "3"]);
        assert_eq!(ids(&store.get_group("g1").unwrap().clients), vec!["2"]);
        assert!(store.selected_clients().is_empty());
        assert!(store.selected_groups().is_empty());
        assert!(!store.get_group("g2").unwrap().selected);
        assert_invariants(&store);
    }

    #[test]
    fn test_delete_selected_clients_with_empty_selection() {
        let mut store = fleet();
        let revision = store.revision();
        assert!(store.delete_selected_clients().is_empty());
        assert_eq!(store.clients().len(), 4);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_select_client_is_idempotent() {
        let mut store = fleet();
        store.select_client("2", true).unwrap();
        let revision = store.revision();
        store.select_client("2", true).unwrap();

        assert_eq!(store.selected_clients(), ["2".to_string()]);
        assert_eq!(store.revision(), revision);
        assert!(store.get_client("2").unwrap().selected);
        assert_invariants(&store);
    }

    #[test]
    fn test_deselect_client() {
        let mut store = fleet();
        store.select_client("2", true).unwrap();
        store.select_client("2", false).unwrap();
        assert!(store.selected_clients().is_empty());
        assert!(!store.get_client("2").unwrap().selected);
        assert_invariants(&store);
    }

    #[test]
    fn test_select_unknown_client_leaves_selection_alone() {
        let mut store = fleet();
        assert!(store.select_client("99", true).is_err());
        assert!(store.selected_clients().is_empty());
    }

    #[test]
    fn test_add_group() {
        let mut store = DirectoryStore::new();
        let group = store.add_group(CreateGroupRequest::named("MIDTERM 2025"));
        assert!(group.clients.is_empty());
        assert!(!group.selected);
        assert_eq!(store.get_group(&group.id).unwrap().name, "MIDTERM 2025");
    }

    #[test]
    fn test_update_group() {
        let mut store = fleet();
        let group = store.update_group("g1", GroupPatch::name("Room B")).unwrap();
        assert_eq!(group.name, "Room B");
        assert_eq!(group.client_count(), 2);
        assert!(store.update_group("nope", GroupPatch::name("x")).is_err());
    }

    #[test]
    fn test_delete_group_ungroups_members() {
        let mut store = room_a();
        let deleted = store.delete_group("g1").unwrap();

        assert_eq!(ids(&deleted.clients), vec!["1"]);
        assert!(store.get_client("1").unwrap().group_id.is_none());
        assert!(store.get_group("g1").is_none());
        assert!(store.groups().is_empty());
        assert_invariants(&store);
    }

    #[test]
    fn test_delete_group_clears_selection_and_keeps_clients() {
        let mut store = fleet();
        store.select_group("g1", true).unwrap();
        store.select_group("g2", true).unwrap();

        store.delete_group("g1").unwrap();
        assert_eq!(store.selected_groups(), ["g2".to_string()]);
        assert_eq!(store.clients().len(), 4);
        assert_eq!(store.get_ungrouped_clients().len(), 3);
        assert_invariants(&store);
    }

    #[test]
    fn test_delete_group_event_lists_ungrouped_clients() {
        let mut store = fleet();
        let mut events = store.subscribe();
        store.delete_group("g1").unwrap();

        let event = events.try_recv().unwrap();
        match event.change {
            StoreChange::GroupDeleted { ungrouped, .. } => {
                assert_eq!(ungrouped, vec!["1".to_string(), "2".to_string()]);
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_select_group_mirrors_flag() {
        let mut store = fleet();
        store.select_group("g2", true).unwrap();
        store.select_group("g2", true).unwrap();
        assert_eq!(store.selected_groups(), ["g2".to_string()]);
        assert!(store.get_group("g2").unwrap().selected);

        store.select_group("g2", false).unwrap();
        assert!(store.selected_groups().is_empty());
        assert_invariants(&store);
    }

    #[test]
    fn test_add_client_to_group_moves_between_groups() {
        let mut store = fleet();
        let moved = store.add_client_to_group("1", "g2").unwrap();

        assert!(moved.in_group("g2"));
        assert_eq!(ids(&store.get_clients_in_group("g1")), vec!["2"]);
        assert_eq!(ids(&store.get_clients_in_group("g2")), vec!["1", "3"]);
        assert_invariants(&store);
    }

    #[test]
    fn test_add_client_to_same_group_is_noop() {
        let mut store = fleet();
        let revision = store.revision();
        store.add_client_to_group("1", "g1").unwrap();
        assert_eq!(store.revision(), revision);
        assert_eq!(store.get_clients_in_group("g1").len(), 2);
    }

    #[test]
    fn test_add_client_to_group_reports_previous_group() {
        let mut store = fleet();
        let mut events = store.subscribe();
        store.add_client_to_group("4", "g1").unwrap();
        store.add_client_to_group("4", "g2").unwrap();

        let first = events.try_recv().unwrap();
        let second = events.try_recv().unwrap();
        assert_eq!(
            first.change,
            StoreChange::ClientMoved {
                client_id: "4".to_string(),
                from_group: None,
                to_group: "g1".to_string(),
            }
        );
        assert_eq!(
            second.change,
            StoreChange::ClientMoved {
                client_id: "4".to_string(),
                from_group: Some("g1".to_string()),
                to_group: "g2".to_string(),
            }
        );
    }

    #[test]
    fn test_add_client_to_group_unknown_ids() {
        let mut store = fleet();
        assert_eq!(
            store.add_client_to_group("99", "g1"),
            Err(DirectoryError::ClientNotFound("99".to_string()))
        );
        assert_eq!(
            store.add_client_to_group("4", "nope"),
            Err(DirectoryError::GroupNotFound("nope".to_string()))
        );
        assert!(store.get_client("4").unwrap().group_id.is_none());
    }

    #[test]
    fn test_remove_client_from_group() {
        let mut store = fleet();
        let removed = store.remove_client_from_group("1", "g1").unwrap();
        assert!(removed.group_id.is_none());
        assert_eq!(ids(&store.get_clients_in_group("g1")), vec!["2"]);
        assert_invariants(&store);
    }

    #[test]
    fn test_remove_client_from_wrong_group() {
        let mut store = fleet();
        let result = store.remove_client_from_group("3", "g1");
        assert_eq!(
            result,
            Err(DirectoryError::ClientNotInGroup {
                client_id: "3".to_string(),
                group_id: "g1".to_string(),
            })
        );
        assert!(store.get_client("3").unwrap().in_group("g2"));
    }

    #[test]
    fn test_select_all_in_group_then_clear() {
        let mut store = room_a();
        store.select_all_in_group("g1").unwrap();
        assert_eq!(store.selected_clients(), ["1".to_string()]);

        store.clear_all_selections();
        assert!(store.selected_clients().is_empty());
        assert!(store.clients().iter().all(|c| !c.selected));
        assert_invariants(&store);
    }

    #[test]
    fn test_select_all_in_group_is_additive() {
        let mut store = fleet();
        store.select_client("4", true).unwrap();

        let newly = store.select_all_in_group("g1").unwrap();
        assert_eq!(newly, 2);
        assert_eq!(
            store.selected_clients(),
            ["4".to_string(), "1".to_string(), "2".to_string()]
        );

        let again = store.select_all_in_group("g1").unwrap();
        assert_eq!(again, 0);
        assert!(store.select_all_in_group("nope").is_err());
        assert_invariants(&store);
    }

    #[test]
    fn test_select_all_clients() {
        let mut store = fleet();
        store.select_client("3", true).unwrap();
        assert_eq!(store.select_all_clients(), 4);
        assert!(store.clients().iter().all(|c| c.selected));
        assert_eq!(store.selected_clients().len(), 4);
        assert_invariants(&store);
    }

    #[test]
    fn test_clear_all_selections_clears_groups() {
        let mut store = fleet();
        store.select_group("g1", true).unwrap();
        store.select_client("1", true).unwrap();

        store.clear_all_selections();
        assert!(store.selected_groups().is_empty());
        assert!(store.groups().iter().all(|g| !g.selected));
        assert_invariants(&store);
    }

    #[test]
    fn test_clear_all_selections_without_selection_publishes_nothing() {
        let mut store = fleet();
        store.clear_all_selections();
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_filter_clients_empty_query_returns_all_in_order() {
        let store = fleet();
        assert_eq!(ids(&store.filter_clients("")), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_filter_clients_by_name_and_id() {
        let store = fleet();
        assert_eq!(ids(&store.filter_clients("lb467")), vec!["1", "2"]);
        assert_eq!(ids(&store.filter_clients("LAB")), vec!["3"]);
        assert_eq!(ids(&store.filter_clients("4")), vec!["1", "2", "4"]);
        assert!(store.filter_clients("zzz").is_empty());
    }

    #[test]
    fn test_filter_groups() {
        let store = fleet();
        assert_eq!(store.filter_groups("").len(), 2);
        let labs = store.filter_groups("lab");
        assert_eq!(labs.len(), 1);
        assert_eq!(labs[0].id, "g2");
        assert_eq!(ids(&labs[0].clients), vec!["3"]);
    }

    #[test]
    fn test_grouped_and_ungrouped_clients() {
        let mut store = fleet();
        store.add_group(CreateGroupRequest::named("Empty"));

        let grouped = store.get_grouped_clients();
        assert_eq!(grouped.len(), 3);
        assert_eq!(ids(&grouped["g1"]), vec!["1", "2"]);
        assert_eq!(ids(&grouped["g2"]), vec!["3"]);
        assert_eq!(ids(&store.get_ungrouped_clients()), vec!["4"]);
    }

    #[test]
    fn test_status_summary() {
        let mut store = fleet();
        store
            .update_client("3", ClientPatch::status(ClientStatus::Error))
            .unwrap();
        store
            .update_client("4", ClientPatch::status(ClientStatus::Warning))
            .unwrap();

        let summary = store.status_summary();
        assert_eq!(summary.total_clients, 4);
        assert_eq!(summary.connected, 2);
        assert_eq!(summary.error, 1);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.grouped, 3);
        assert_eq!(summary.ungrouped, 1);
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.needing_attention(), 2);
    }

    #[test]
    fn test_resolve_audience_client_and_group() {
        let store = fleet();
        let audience = store
            .resolve_audience(&AudienceTarget::Client("3".to_string()))
            .unwrap();
        assert_eq!(audience.description, "client ComputerLab01");
        assert_eq!(audience.client_ids, vec!["3".to_string()]);

        let audience = store
            .resolve_audience(&AudienceTarget::Group("g1".to_string()))
            .unwrap();
        assert_eq!(audience.description, "group Room A");
        assert_eq!(audience.recipient_count(), 2);

        assert!(store
            .resolve_audience(&AudienceTarget::Group("nope".to_string()))
            .is_err());
    }

    #[test]
    fn test_resolve_audience_selection() {
        let mut store = fleet();
        store.select_client("1", true).unwrap();
        store.select_client("4", true).unwrap();
        store.select_group("g1", true).unwrap();

        let audience = store.resolve_audience(&AudienceTarget::Selection).unwrap();
        assert_eq!(audience.description, "2 clients and 1 group");
        assert_eq!(
            audience.client_ids,
            vec!["1".to_string(), "2".to_string(), "4".to_string()]
        );
    }

    #[test]
    fn test_resolve_audience_empty_selection_means_all() {
        let store = fleet();
        let audience = store.resolve_audience(&AudienceTarget::Selection).unwrap();
        assert_eq!(audience.description, "all clients");
        assert_eq!(audience.recipient_count(), 4);
        assert_eq!(
            store.resolve_audience(&AudienceTarget::All).unwrap(),
            audience
        );
    }

    #[test]
    fn test_events_carry_increasing_revisions() {
        let mut store = room_a();
        let mut events = store.subscribe();

        store.add_client(CreateClientRequest::named("Lobby")).unwrap();
        store.select_all_clients();
        store.delete_group("g1").unwrap();

        let revisions: Vec<u64> = (0..3).map(|_| events.try_recv().unwrap().revision).collect();
        assert_eq!(revisions, vec![1, 2, 3]);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_failed_operations_publish_nothing() {
        let mut store = room_a();
        let mut events = store.subscribe();

        let _ = store.delete_client("99");
        let _ = store.select_group("99", true);
        let _ = store.remove_client_from_group("1", "nope");

        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let mut store = fleet();
        store.select_group("g2", true).unwrap();
        let snapshot = store.snapshot();

        assert_eq!(snapshot.revision, store.revision());
        assert_eq!(snapshot.clients.len(), 4);
        assert_eq!(snapshot.groups.len(), 2);
        assert_eq!(snapshot.selected_groups, vec!["g2".to_string()]);
    }

    #[test]
    fn test_invariants_hold_across_mixed_operations() {
        let mut store = fleet();
        let mut created = Vec::new();

        for round in 0..30 {
            let name: String = Word().fake();
            match round % 10 {
                0 => {
                    let group = store.add_group(CreateGroupRequest::named(name));
                    created.push(group.id);
                }
                1 => {
                    let client = store
                        .add_client(CreateClientRequest::named(name).in_group("g1"))
                        .unwrap();
                    store.select_client(&client.id, true).unwrap();
                }
                2 => {
                    if let Some(group_id) = created.last() {
                        let _ = store.add_client_to_group("4", group_id);
                    }
                }
                3 => {
                    store.select_all_in_group("g1").unwrap();
                }
                4 => {
                    if let Some(group_id) = created.pop() {
                        store.select_group(&group_id, true).unwrap();
                        store.delete_group(&group_id).unwrap();
                    }
                }
                5 => {
                    let _ = store.remove_client_from_group("2", "g1");
                }
                6 => {
                    let _ = store.update_client("3", ClientPatch::name(name));
                }
                7 => {
                    if let Some(last) = store.clients().last().map(|c| c.id.clone()) {
                        store.delete_client(&last).unwrap();
                    }
                }
                8 => {
                    store.select_all_clients();
                }
                _ => store.clear_all_selections(),
            }
            assert_invariants(&store);
        }
    }
}
