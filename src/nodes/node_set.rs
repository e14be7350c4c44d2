//! Per-widget node collection
//!
//! Owns the ports of one widget in registration order, hands out deterministic
//! ids, and keeps expandable groups in step with connection changes. Layout is
//! not computed here; callers reflow after mutating.

use super::group::{ExpandableGroup, GroupConfig, GroupSnapshot};
use super::ids::{ConnectionId, PortId, WidgetId};
use super::port::{Port, PortDirection, PortOptions};
use super::registry::NodeRegistryHandle;
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Debug)]
pub struct NodeSet {
    owner: WidgetId,
    registry: NodeRegistryHandle,
    ports: Vec<Port>,
    /// Next index per `<direction>:<type>`
    counters: HashMap<String, usize>,
    groups: Vec<ExpandableGroup>,
    /// Connections held by removed ports, waiting for the connection owner
    released: Vec<ConnectionId>,
}

impl NodeSet {
    pub fn new(owner: WidgetId, registry: NodeRegistryHandle) -> Self {
        Self {
            owner,
            registry,
            ports: Vec::new(),
            counters: HashMap::new(),
            groups: Vec::new(),
            released: Vec::new(),
        }
    }

    pub fn owner(&self) -> &WidgetId {
        &self.owner
    }

    pub fn registry(&self) -> &NodeRegistryHandle {
        &self.registry
    }

    /// Creates and registers a port, returning its id
    ///
    /// Returns `None` when `port_type` is empty. A forced id that is already
    /// live elsewhere is replaced by a generated one.
    pub fn add_node(
        &mut self,
        direction: PortDirection,
        port_type: &str,
        label: impl Into<String>,
        relative_x: f32,
        relative_y: f32,
        options: PortOptions,
    ) -> Option<PortId> {
        if port_type.is_empty() {
            return None;
        }

        let counter_key = format!("{}:{}", direction.as_str(), port_type);
        let mut id = options.node_id.clone().filter(|forced| {
            let free = !self.registry.contains(forced);
            if !free {
                warn!("Port id {} is already live, generating a new one", forced);
            }
            free
        });
        let forced = id.is_some();

        loop {
            let counter = self.counters.entry(counter_key.clone()).or_insert(0);
            *counter += 1;
            if forced {
                break;
            }
            let candidate = PortId::new(format!("{}-{}-{}", self.owner, counter_key, counter));
            if !self.registry.contains(&candidate) {
                id = Some(candidate);
                break;
            }
        }

        let id = id?;
        if !self.registry.register(id.clone(), self.owner.clone()) {
            return None;
        }
        let port = Port::new(id.clone(), direction, port_type, label, relative_x, relative_y)
            .with_options(&options);
        self.ports.push(port);
        Some(id)
    }

    /// Removes one port and returns the connections it released
    ///
    /// The released ids are also queued until [`Self::take_released`] drains them.
    pub fn remove_node(&mut self, id: &PortId) -> Vec<ConnectionId> {
        let Some(index) = self.ports.iter().position(|p| p.id == *id) else {
            return Vec::new();
        };
        let port = self.ports.remove(index);
        self.registry.unregister(&port.id);
        if let Some(key) = &port.group {
            if let Some(group) = self.groups.iter_mut().find(|g| g.key == *key) {
                group.members.retain(|member| member != id);
            }
        }
        let released: Vec<ConnectionId> = port.connections.into_iter().collect();
        self.released.extend(released.iter().cloned());
        released
    }

    /// Drains the connections released by removed ports
    pub fn take_released(&mut self) -> Vec<ConnectionId> {
        std::mem::take(&mut self.released)
    }

    /// Removes every port, group and id counter
    ///
    /// Connections attached to the removed ports are left for the connection
    /// owner to tear down.
    pub fn clear_nodes(&mut self) {
        for port in self.ports.drain(..) {
            self.registry.unregister(&port.id);
        }
        self.groups.clear();
        self.counters.clear();
    }

    pub fn port(&self, id: &PortId) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == *id)
    }

    pub fn port_mut(&mut self, id: &PortId) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.id == *id)
    }

    pub fn contains(&self, id: &PortId) -> bool {
        self.port(id).is_some()
    }

    /// Ports in registration order
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut [Port] {
        &mut self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn attach_connection(&mut self, id: &PortId, connection: ConnectionId) -> bool {
        match self.port_mut(id) {
            Some(port) => port.connections.insert(connection),
            None => false,
        }
    }

    pub fn detach_connection(&mut self, id: &PortId, connection: &ConnectionId) -> bool {
        match self.port_mut(id) {
            Some(port) => port.connections.remove(connection),
            None => false,
        }
    }

    /// Creates a group with one free slot and returns that slot's id
    ///
    /// A second call with the same key leaves the existing group untouched.
    pub fn create_expandable_group(&mut self, key: &str, config: GroupConfig) -> Option<PortId> {
        if self.group(key).is_some() {
            debug!("Expandable group {} already exists on {}", key, self.owner);
            return None;
        }
        self.groups.push(ExpandableGroup::new(key, config));
        let first = self.append_group_slot(key, None);
        self.space_group(key);
        first
    }

    pub fn group(&self, key: &str) -> Option<&ExpandableGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn groups(&self) -> &[ExpandableGroup] {
        &self.groups
    }

    /// Number of unconnected slots in a group
    pub fn free_slots(&self, key: &str) -> usize {
        self.group(key)
            .map(|group| {
                group
                    .members
                    .iter()
                    .filter_map(|id| self.port(id))
                    .filter(|port| !port.is_connected())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Updates the group owning `id` after its connections changed
    ///
    /// Returns true if the group was re-spaced.
    pub fn handle_connection_change(&mut self, id: &PortId) -> bool {
        let Some(port) = self.port(id) else {
            return false;
        };
        let connected = port.is_connected();
        let Some(key) = port.group.clone() else {
            return false;
        };
        let Some(group) = self.groups.iter_mut().find(|g| g.key == key) else {
            return false;
        };

        let live: Vec<PortId> = group
            .members
            .iter()
            .filter(|member| self.ports.iter().any(|p| p.id == **member))
            .cloned()
            .collect();
        group.members = live;
        let free: Vec<bool> = group
            .members
            .iter()
            .map(|member| {
                self.ports
                    .iter()
                    .find(|p| p.id == *member)
                    .map_or(false, |p| !p.is_connected())
            })
            .collect();

        if connected {
            if group.should_grow(&free) {
                let slot = self.append_group_slot(&key, None);
                debug!("Group {} grew to include {:?}", key, slot);
            } else if free.iter().all(|f| !f) {
                debug!("Group {} is saturated", key);
            }
        } else {
            let trimmed: Vec<PortId> = group
                .slots_to_trim(&free)
                .into_iter()
                .map(|index| group.members[index].clone())
                .collect();
            for slot in &trimmed {
                self.remove_node(slot);
            }
            if !trimmed.is_empty() {
                debug!("Group {} trimmed {} free slot(s)", key, trimmed.len());
            }
        }

        self.space_group(&key);
        true
    }

    pub fn group_snapshots(&self) -> Vec<GroupSnapshot> {
        self.groups.iter().map(ExpandableGroup::snapshot).collect()
    }

    /// Reconciles a group with saved slot ids, without trimming
    ///
    /// Saved slots that are already live members keep their connections. Missing
    /// ones are re-created with the saved id. Unsaved free members are dropped;
    /// unsaved connected members stay after the saved ones.
    pub fn restore_group(&mut self, snapshot: &GroupSnapshot) -> bool {
        let Some(group) = self.group(&snapshot.key) else {
            return false;
        };
        let current = group.members.clone();

        let mut saved: Vec<PortId> = Vec::new();
        for slot in &snapshot.slots {
            if !saved.contains(slot) {
                saved.push(slot.clone());
            }
        }
        let mut extra = Vec::new();
        for member in current.iter().filter(|member| !saved.contains(member)) {
            if self.port(member).map_or(false, Port::is_connected) {
                extra.push(member.clone());
            } else {
                self.remove_node(member);
            }
        }

        if let Some(group) = self.groups.iter_mut().find(|g| g.key == snapshot.key) {
            group.members.clear();
        }
        for slot in &saved {
            if current.contains(slot) && self.contains(slot) {
                self.push_member(&snapshot.key, slot.clone());
            } else {
                self.append_group_slot(&snapshot.key, Some(slot.clone()));
            }
        }
        for member in extra {
            debug!("Group {} keeps unsaved connected slot {}", snapshot.key, member);
            self.push_member(&snapshot.key, member);
        }
        if self.group(&snapshot.key).map_or(true, |g| g.members.is_empty()) {
            self.append_group_slot(&snapshot.key, None);
        }
        self.space_group(&snapshot.key);
        true
    }

    fn push_member(&mut self, key: &str, id: PortId) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.key == key) {
            group.members.push(id);
        }
    }

    fn append_group_slot(&mut self, key: &str, preserved: Option<PortId>) -> Option<PortId> {
        let group = self.group(key)?;
        let config = group.config.clone();
        let label = config.label_for(group.next_index());

        let mut options = PortOptions::new()
            .in_group(key)
            .multiple(config.allow_multiple_connections)
            .with_id(preserved);
        options.section = config.section.clone();
        options.anchor = config.anchor.clone();
        options.anchor_offset = config.anchor_offset;
        options.min_spacing = config.min_spacing;

        let id = self.add_node(
            config.direction,
            &config.node_type,
            label,
            config.relative_x(),
            config.relative_y_for(0, 1),
            options,
        )?;
        self.push_member(key, id.clone());
        Some(id)
    }

    /// Spreads a group's slots evenly over its band
    fn space_group(&mut self, key: &str) {
        let Some(group) = self.group(key) else {
            return;
        };
        let placements: Vec<(PortId, f32)> = group
            .members
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), group.config.relative_y_for(index, group.members.len())))
            .collect();
        for (id, relative_y) in placements {
            if let Some(port) = self.port_mut(&id) {
                port.relative_y = relative_y;
            }
        }
    }
}

impl Drop for NodeSet {
    fn drop(&mut self) {
        for port in &self.ports {
            self.registry.unregister(&port.id);
        }
    }
}
