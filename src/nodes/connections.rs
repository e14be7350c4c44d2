//! Connection registry and type compatibility

use super::ids::{ConnectionId, PortId};
use super::registry::NodeRegistryHandle;
use log::debug;
use serde::{Deserialize, Serialize};

/// Extra type pairs that may be connected besides exact matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityRules {
    pairs: Vec<(String, String)>,
}

impl CompatibilityRules {
    /// Only exact type matches
    pub fn exact() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn allow(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.pairs.push((a.into(), b.into()));
        self
    }

    /// Symmetric check: `a` connects to `b` iff `b` connects to `a`
    pub fn are_compatible(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .pairs
                .iter()
                .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

impl Default for CompatibilityRules {
    fn default() -> Self {
        Self::exact().allow("magazine", "weapon")
    }
}

/// A link from an output port to an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: PortId,
    pub to: PortId,
}

impl Connection {
    /// Creates a connection; `from` must be the output side
    pub fn new(from: PortId, to: PortId) -> Self {
        Self {
            id: ConnectionId::between(&from, &to),
            from,
            to,
        }
    }

    pub fn touches(&self, port: &PortId) -> bool {
        self.from == *port || self.to == *port
    }
}

/// Persisted form of a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub source_node_id: PortId,
    pub target_node_id: PortId,
}

/// All connections on a canvas, in creation order
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, connection: Connection) -> bool {
        if self.contains(&connection.id) {
            return false;
        }
        self.connections.push(connection);
        true
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.id == *id)?;
        Some(self.connections.remove(index))
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == *id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of every connection attached to `port`
    pub fn touching(&self, port: &PortId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|c| c.touches(port))
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn clear(&mut self) {
        self.connections.clear();
    }

    pub fn to_records(&self) -> Vec<ConnectionRecord> {
        self.connections
            .iter()
            .map(|c| ConnectionRecord {
                source_node_id: c.from.clone(),
                target_node_id: c.to.clone(),
            })
            .collect()
    }

    /// Removes connections whose endpoints are no longer registered
    pub fn prune_dangling(&mut self, registry: &NodeRegistryHandle) -> Vec<Connection> {
        let (kept, dropped): (Vec<Connection>, Vec<Connection>) = self
            .connections
            .drain(..)
            .partition(|c| registry.contains(&c.from) && registry.contains(&c.to));
        self.connections = kept;
        for connection in &dropped {
            debug!("Pruned dangling connection {}", connection.id);
        }
        dropped
    }
}
