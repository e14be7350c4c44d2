//! Port types and functionality for node connections

use super::ids::{ConnectionId, PortId};
use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Direction of a port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

/// Optional settings accepted by `add_node`
#[derive(Debug, Clone, Default)]
pub struct PortOptions {
    /// Layout anchor the port is pinned near
    pub anchor: Option<String>,
    /// Pixel offset added to the anchor center
    pub anchor_offset: f32,
    /// Minimum separation from ports on the same anchor; falls back to the layout default
    pub min_spacing: Option<f32>,
    /// Section the port is drawn in
    pub section: Option<String>,
    /// Expandable group the port belongs to
    pub group: Option<String>,
    pub allow_multiple_connections: bool,
    /// Forces a specific id, used when restoring saved widgets
    pub node_id: Option<PortId>,
}

impl PortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>, offset: f32) -> Self {
        self.anchor = Some(anchor.into());
        self.anchor_offset = offset;
        self
    }

    pub fn with_min_spacing(mut self, spacing: f32) -> Self {
        self.min_spacing = Some(spacing);
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn multiple(mut self, allow: bool) -> Self {
        self.allow_multiple_connections = allow;
        self
    }

    pub fn with_id(mut self, id: Option<PortId>) -> Self {
        self.node_id = id;
        self
    }
}

/// Represents a connection point on a widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub direction: PortDirection,
    /// Type tag, e.g. "power" or "weapon"
    pub port_type: String,
    pub label: String,
    /// Horizontal position in the content area, 0.0 (left) to 1.0 (right)
    pub relative_x: f32,
    /// Vertical position in the content area, 0.0 (top) to 1.0 (bottom)
    pub relative_y: f32,
    pub anchor: Option<String>,
    pub anchor_offset: f32,
    pub min_spacing: Option<f32>,
    pub section: Option<String>,
    pub group: Option<String>,
    pub allow_multiple_connections: bool,
    /// Connections currently attached; owned by the connection registry
    #[serde(skip)]
    pub connections: BTreeSet<ConnectionId>,
    /// On-widget pixel position computed by the last reflow
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
}

impl Port {
    /// Creates a new port
    pub fn new(
        id: PortId,
        direction: PortDirection,
        port_type: impl Into<String>,
        label: impl Into<String>,
        relative_x: f32,
        relative_y: f32,
    ) -> Self {
        Self {
            id,
            direction,
            port_type: port_type.into(),
            label: label.into(),
            relative_x,
            relative_y,
            anchor: None,
            anchor_offset: 0.0,
            min_spacing: None,
            section: None,
            group: None,
            allow_multiple_connections: false,
            connections: BTreeSet::new(),
            position: Pos2::ZERO,
        }
    }

    /// Applies the layout and grouping settings from `options`
    pub fn with_options(mut self, options: &PortOptions) -> Self {
        self.anchor = options.anchor.clone();
        self.anchor_offset = options.anchor_offset;
        self.min_spacing = options.min_spacing;
        self.section = options.section.clone();
        self.group = options.group.clone();
        self.allow_multiple_connections = options.allow_multiple_connections;
        self
    }

    /// Checks if this port is an input
    pub fn is_input(&self) -> bool {
        matches!(self.direction, PortDirection::Input)
    }

    /// Checks if this port is an output
    pub fn is_output(&self) -> bool {
        matches!(self.direction, PortDirection::Output)
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

// Serde helper module for Pos2
mod pos2_serde {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(pos: &Pos2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pos2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Pos2::new(x, y))
    }
}
