//! Canvas - owns widgets, the node registry and the connection registry
//!
//! Widgets never touch each other's ports. Every cross-widget effect goes
//! through the canvas, which updates both endpoints and then notifies each
//! owning widget with `handle_node_connection_change`.

use crate::config::EngineConfig;
use crate::constants::snapshot::{CREATOR, VERSION};
use crate::error::{NodeError, NodeResult};
use crate::nodes::connections::{Connection, ConnectionRecord, ConnectionRegistry};
use crate::nodes::ids::{ConnectionId, PortId, WidgetId};
use crate::nodes::port::Port;
use crate::nodes::registry::NodeRegistryHandle;
use crate::widgets::{create_widget, Widget, WidgetEnvelope, WidgetKind};
use egui::Pos2;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Metadata for saved canvases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created: String,  // RFC 3339 timestamp
    pub modified: String, // RFC 3339 timestamp
    pub creator: String,
    #[serde(default)]
    pub description: String,
}

/// Saved canvas: widget envelopes plus the connections between their ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub version: String,
    pub metadata: SnapshotMetadata,
    pub widgets: Vec<WidgetEnvelope>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug)]
pub struct Canvas {
    registry: NodeRegistryHandle,
    config: EngineConfig,
    widgets: Vec<Box<dyn Widget>>,
    connections: ConnectionRegistry,
    /// Creation time of the snapshot this canvas was loaded from
    created: Option<String>,
}

impl Canvas {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: NodeRegistryHandle::new(),
            config,
            widgets: Vec::new(),
            connections: ConnectionRegistry::new(),
            created: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistryHandle {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    // Widgets

    /// Creates a widget of `kind` at `position` and returns its id
    pub fn add_widget(&mut self, kind: WidgetKind, position: Pos2) -> WidgetId {
        let id = WidgetId::generate();
        let mut widget = create_widget(
            kind,
            id.clone(),
            self.registry.clone(),
            self.config.layout.clone(),
        );
        widget.core_mut().set_position(position);
        info!("Added {} widget {}", kind, id);
        self.widgets.push(widget);
        id
    }

    /// Removes a widget, tearing down every connection to its ports
    pub fn remove_widget(&mut self, id: &WidgetId) -> bool {
        let Some(index) = self.widgets.iter().position(|w| w.id() == id) else {
            return false;
        };
        let attached: Vec<ConnectionId> = self.widgets[index]
            .core()
            .ports()
            .iter()
            .flat_map(|port| self.connections.touching(&port.id))
            .collect();
        for connection in attached {
            self.release(&connection, Some(id));
        }
        let mut widget = self.widgets.remove(index);
        widget.core_mut().clear_nodes();
        info!("Removed widget {}", id);
        true
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&dyn Widget> {
        self.widgets.iter().find(|w| w.id() == id).map(|w| w.as_ref())
    }

    pub fn widget_mut(&mut self, id: &WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        self.widgets.iter_mut().find(|w| w.id() == id).map(|w| w.as_mut())
    }

    pub fn widgets(&self) -> impl Iterator<Item = &dyn Widget> {
        self.widgets.iter().map(|w| w.as_ref())
    }

    /// Loads saved data into a live widget and settles the connections it dropped
    pub fn reload_widget_data(&mut self, id: &WidgetId, data: &Value) -> NodeResult<()> {
        let widget = self
            .widget_mut(id)
            .ok_or_else(|| NodeError::UnknownWidget(id.clone()))?;
        widget.load_serialized_data(data);
        self.prune_dangling();
        Ok(())
    }

    pub fn set_minimized(&mut self, id: &WidgetId, minimized: bool) -> NodeResult<()> {
        let widget = self
            .widget_mut(id)
            .ok_or_else(|| NodeError::UnknownWidget(id.clone()))?;
        widget.set_minimized(minimized);
        Ok(())
    }

    // Ports

    pub fn port(&self, id: &PortId) -> Option<&Port> {
        self.locate(id).ok().map(|(_, port)| port)
    }

    pub fn port_canvas_position(&self, id: &PortId) -> Option<Pos2> {
        let owner = self.registry.owner(id)?;
        self.widget(&owner)?.core().port_canvas_position(id)
    }

    /// Canvas positions of a connection's output and input ends
    pub fn connection_endpoints(&self, id: &ConnectionId) -> Option<(Pos2, Pos2)> {
        let connection = self.connections.get(id)?;
        Some((
            self.port_canvas_position(&connection.from)?,
            self.port_canvas_position(&connection.to)?,
        ))
    }

    fn locate(&self, id: &PortId) -> NodeResult<(&dyn Widget, &Port)> {
        let unknown = || NodeError::UnknownPort(id.clone());
        let owner = self.registry.owner(id).ok_or_else(unknown)?;
        let widget = self.widget(&owner).ok_or_else(unknown)?;
        let port = widget.core().port(id).ok_or_else(unknown)?;
        Ok((widget, port))
    }

    // Connections

    /// Checks whether `a` and `b` may be connected
    pub fn can_connect(&self, a: &PortId, b: &PortId) -> NodeResult<()> {
        if a == b {
            return Err(NodeError::SelfConnection(a.clone()));
        }
        let (widget_a, port_a) = self.locate(a)?;
        let (widget_b, port_b) = self.locate(b)?;
        if widget_a.id() == widget_b.id() {
            return Err(NodeError::SameWidget(a.clone(), b.clone()));
        }
        if port_a.direction == port_b.direction {
            return Err(NodeError::SameDirection(a.clone(), b.clone()));
        }
        let id = ConnectionId::between(a, b);
        if self.connections.contains(&id) {
            return Err(NodeError::DuplicateConnection(id));
        }

        let verdicts = [
            widget_a.accepts_connection(port_a, &port_b.port_type),
            widget_b.accepts_connection(port_b, &port_a.port_type),
        ];
        let compatible = if verdicts.contains(&Some(false)) {
            false
        } else if verdicts.contains(&Some(true)) {
            true
        } else {
            self.config
                .compatibility
                .are_compatible(&port_a.port_type, &port_b.port_type)
        };
        if !compatible {
            return Err(NodeError::IncompatibleTypes(
                port_a.port_type.clone(),
                port_b.port_type.clone(),
            ));
        }
        Ok(())
    }

    /// Connects two ports in either order
    ///
    /// An endpoint that allows a single connection drops the one it holds.
    pub fn connect(&mut self, a: &PortId, b: &PortId) -> NodeResult<ConnectionId> {
        self.settle_released();
        self.can_connect(a, b)?;
        let a_is_output = self.port(a).map_or(false, Port::is_output);
        let (from, to) = if a_is_output {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };

        for endpoint in [&from, &to] {
            let Some(port) = self.port(endpoint) else { continue };
            if port.allow_multiple_connections {
                continue;
            }
            let evicted: Vec<ConnectionId> = port.connections.iter().cloned().collect();
            for connection in evicted {
                info!("Evicting connection {} from port {}", connection, endpoint);
                self.release_except(&connection, endpoint);
            }
        }

        let connection = Connection::new(from.clone(), to.clone());
        let id = connection.id.clone();
        self.connections.insert(connection);
        for endpoint in [&from, &to] {
            self.attach(endpoint, &id);
        }
        for endpoint in [&from, &to] {
            self.notify(endpoint);
        }
        debug!("Connected {} -> {}", from, to);
        Ok(id)
    }

    /// Connects `source` to whichever port `target` offers for it
    pub fn connect_to_widget(&mut self, source: &PortId, target: &WidgetId) -> NodeResult<ConnectionId> {
        let (port_type, direction) = {
            let (_, port) = self.locate(source)?;
            (port.port_type.clone(), port.direction)
        };
        let rules = self.config.compatibility.clone();
        let widget = self
            .widget_mut(target)
            .ok_or_else(|| NodeError::UnknownWidget(target.clone()))?;
        let port = widget
            .accept_drop(&port_type, direction, &rules)
            .ok_or_else(|| NodeError::NoCompatiblePort(target.clone(), port_type.clone()))?;
        self.connect(source, &port)
    }

    pub fn disconnect(&mut self, id: &ConnectionId) -> bool {
        self.settle_released();
        self.release(id, None)
    }

    /// Drops connections whose ports no longer exist
    pub fn prune_dangling(&mut self) -> usize {
        let settled = self.settle_released();
        let dropped = self.connections.prune_dangling(&self.registry);
        for connection in &dropped {
            for endpoint in [&connection.from, &connection.to] {
                if self.detach(endpoint, &connection.id) {
                    self.notify(endpoint);
                }
            }
        }
        settled + dropped.len()
    }

    /// Tears down connections held by ports that widgets removed themselves
    fn settle_released(&mut self) -> usize {
        let released: Vec<ConnectionId> = self
            .widgets
            .iter_mut()
            .flat_map(|widget| widget.core_mut().nodes_mut().take_released())
            .collect();
        let mut settled = 0;
        for id in &released {
            if self.release(id, None) {
                settled += 1;
            }
        }
        settled
    }

    /// Removes a connection and notifies its endpoints, skipping those owned by `skip_widget`
    fn release(&mut self, id: &ConnectionId, skip_widget: Option<&WidgetId>) -> bool {
        let Some(connection) = self.connections.remove(id) else {
            return false;
        };
        for endpoint in [&connection.from, &connection.to] {
            self.detach(endpoint, id);
            let skipped = skip_widget.is_some() && self.registry.owner(endpoint).as_ref() == skip_widget;
            if !skipped {
                self.notify(endpoint);
            }
        }
        debug!("Disconnected {}", id);
        true
    }

    /// Removes a connection without notifying `keep`, which is about to be reconnected
    fn release_except(&mut self, id: &ConnectionId, keep: &PortId) {
        let Some(connection) = self.connections.remove(id) else {
            return;
        };
        for endpoint in [&connection.from, &connection.to] {
            self.detach(endpoint, id);
            if endpoint != keep {
                self.notify(endpoint);
            }
        }
    }

    fn attach(&mut self, port: &PortId, connection: &ConnectionId) -> bool {
        let Some(owner) = self.registry.owner(port) else {
            return false;
        };
        self.widget_mut(&owner).map_or(false, |widget| {
            widget
                .core_mut()
                .nodes_mut()
                .attach_connection(port, connection.clone())
        })
    }

    fn detach(&mut self, port: &PortId, connection: &ConnectionId) -> bool {
        let Some(owner) = self.registry.owner(port) else {
            return false;
        };
        self.widget_mut(&owner).map_or(false, |widget| {
            widget
                .core_mut()
                .nodes_mut()
                .detach_connection(port, connection)
        })
    }

    fn notify(&mut self, port: &PortId) {
        if let Some(owner) = self.registry.owner(port) {
            if let Some(widget) = self.widget_mut(&owner) {
                widget.handle_node_connection_change(port);
            }
        }
    }

    // Persistence

    pub fn save(&self) -> CanvasSnapshot {
        let now = chrono::Utc::now().to_rfc3339();
        CanvasSnapshot {
            version: VERSION.to_string(),
            metadata: SnapshotMetadata {
                created: self.created.clone().unwrap_or_else(|| now.clone()),
                modified: now,
                creator: CREATOR.to_string(),
                description: String::new(),
            },
            widgets: self.widgets.iter().map(|w| w.to_envelope()).collect(),
            connections: self.connections.to_records(),
        }
    }

    /// Replaces the canvas contents with a snapshot
    ///
    /// Returns the connection records that no longer validate and were skipped.
    pub fn load(&mut self, snapshot: &CanvasSnapshot) -> Vec<ConnectionRecord> {
        self.clear();
        for envelope in &snapshot.widgets {
            let mut widget = create_widget(
                envelope.kind,
                envelope.id.clone(),
                self.registry.clone(),
                self.config.layout.clone(),
            );
            widget.restore_envelope(envelope);
            self.widgets.push(widget);
        }

        let mut skipped = Vec::new();
        for record in &snapshot.connections {
            if let Err(error) = self.connect(&record.source_node_id, &record.target_node_id) {
                debug!(
                    "Skipping connection {} -> {}: {}",
                    record.source_node_id, record.target_node_id, error
                );
                skipped.push(record.clone());
            }
        }
        self.prune_dangling();
        self.created = Some(snapshot.metadata.created.clone());
        info!(
            "Loaded {} widgets and {} connections",
            self.widgets.len(),
            self.connections.len()
        );
        skipped
    }

    /// Removes every widget and connection
    pub fn clear(&mut self) {
        self.connections.clear();
        self.widgets.clear();
        self.created = None;
    }

    pub fn to_json(&self) -> NodeResult<String> {
        Ok(serde_json::to_string_pretty(&self.save())?)
    }

    pub fn from_json(json: &str, config: EngineConfig) -> NodeResult<Self> {
        let snapshot: CanvasSnapshot = serde_json::from_str(json)?;
        let mut canvas = Self::new(config);
        canvas.load(&snapshot);
        Ok(canvas)
    }

    pub fn save_to_file(&self, path: &Path) -> NodeResult<()> {
        std::fs::write(path, self.to_json()?)?;
        info!("Saved canvas to {}", path.display());
        Ok(())
    }

    pub fn load_from_file(path: &Path, config: EngineConfig) -> NodeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, config)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::routes::SECTION_ID;
    use crate::widgets::loadout::{CRAFT_SLOTS, WEAPON_SLOTS};

    fn first_port(canvas: &Canvas, widget: &WidgetId, output: bool) -> PortId {
        canvas
            .widget(widget)
            .unwrap()
            .core()
            .ports()
            .iter()
            .find(|port| port.is_output() == output)
            .map(|port| port.id.clone())
            .unwrap()
    }

    #[test]
    fn test_connect_validates() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let factory = canvas.add_widget(WidgetKind::Factories, Pos2::ZERO);
        let weapon = first_port(&canvas, &missile, true);
        let components_in = first_port(&canvas, &factory, false);
        let products_out = first_port(&canvas, &factory, true);

        assert!(matches!(canvas.connect(&weapon, &weapon), Err(NodeError::SelfConnection(_))));
        assert!(matches!(
            canvas.connect(&components_in, &products_out),
            Err(NodeError::SameWidget(_, _))
        ));
        assert!(matches!(
            canvas.connect(&weapon, &products_out),
            Err(NodeError::SameDirection(_, _))
        ));
        assert!(matches!(
            canvas.connect(&weapon, &components_in),
            Err(NodeError::IncompatibleTypes(_, _))
        ));
        assert!(matches!(
            canvas.connect(&weapon, &PortId::from("nope")),
            Err(NodeError::UnknownPort(_))
        ));
    }

    #[test]
    fn test_connect_orders_endpoints_and_rejects_duplicates() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);
        let weapon = first_port(&canvas, &missile, true);
        let slot = canvas.widget(&loadout).unwrap().core().nodes().group("weapon-slots").unwrap().members[0].clone();

        let id = canvas.connect(&slot, &weapon).unwrap();
        let connection = canvas.connections().get(&id).unwrap();
        assert_eq!(connection.from, weapon);
        assert_eq!(connection.to, slot);
        assert!(canvas.port(&weapon).unwrap().is_connected());
        assert!(matches!(
            canvas.connect(&weapon, &slot),
            Err(NodeError::DuplicateConnection(_))
        ));
    }

    #[test]
    fn test_single_connection_input_evicts() {
        let mut canvas = Canvas::default();
        let first = canvas.add_widget(WidgetKind::Factories, Pos2::ZERO);
        let second = canvas.add_widget(WidgetKind::Factories, Pos2::ZERO);
        let target = canvas.add_widget(WidgetKind::Factories, Pos2::ZERO);
        let input = first_port(&canvas, &target, false);

        let old = canvas
            .connect(&first_port(&canvas, &first, true), &input)
            .unwrap();
        let new = canvas
            .connect(&first_port(&canvas, &second, true), &input)
            .unwrap();
        assert!(!canvas.connections().contains(&old));
        assert!(canvas.connections().contains(&new));
        assert_eq!(canvas.port(&input).unwrap().connection_count(), 1);
        assert!(!canvas.port(&first_port(&canvas, &first, true)).unwrap().is_connected());
    }

    #[test]
    fn test_group_grows_through_canvas() {
        let mut canvas = Canvas::default();
        let loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);
        let craft_source = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
        let slot = canvas.widget(&loadout).unwrap().core().nodes().group(CRAFT_SLOTS).unwrap().members[0].clone();
        canvas.connect_to_widget(&slot, &craft_source).unwrap();

        let group = canvas.widget(&loadout).unwrap().core().nodes().group(CRAFT_SLOTS).unwrap();
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn test_connect_to_widget_uses_reroute_route() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
        let weapon = first_port(&canvas, &missile, true);

        canvas.connect_to_widget(&weapon, &reroute).unwrap();
        let rows = canvas.widget(&reroute).unwrap().core().list(SECTION_ID).unwrap();
        assert_eq!(rows[0].name, "Weapon");
        assert_eq!(rows[0].details, "1 in • 0 out");
    }

    #[test]
    fn test_connect_to_widget_without_match() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let factory = canvas.add_widget(WidgetKind::Factories, Pos2::ZERO);
        let weapon = first_port(&canvas, &missile, true);
        assert!(matches!(
            canvas.connect_to_widget(&weapon, &factory),
            Err(NodeError::NoCompatiblePort(_, _))
        ));
    }

    #[test]
    fn test_remove_widget_releases_remote_ports() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
        let weapon = first_port(&canvas, &missile, true);
        canvas.connect_to_widget(&weapon, &reroute).unwrap();

        assert!(canvas.remove_widget(&missile));
        assert!(canvas.connections().is_empty());
        assert!(canvas.widget(&missile).is_none());
        assert!(!canvas.registry().contains(&weapon));
        let rows = canvas.widget(&reroute).unwrap().core().list(SECTION_ID).unwrap();
        assert_eq!(rows[0].details, "0 in • 0 out");
    }

    #[test]
    fn test_reload_connected_reroute_in_place() {
        let mut canvas = Canvas::default();
        let first = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let second = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
        canvas
            .connect_to_widget(&first_port(&canvas, &first, true), &reroute)
            .unwrap();

        let widget = canvas.widget_mut(&reroute).unwrap();
        let saved = widget.serialized_data();
        widget.load_serialized_data(&saved);
        let input = PortId::from(saved["routes"][0]["inputId"].as_str().unwrap());
        assert_eq!(canvas.port(&input).unwrap().connection_count(), 1);
        let rows = canvas.widget(&reroute).unwrap().core().list(SECTION_ID).unwrap();
        assert_eq!(rows[0].details, "1 in • 0 out");

        canvas
            .connect_to_widget(&first_port(&canvas, &second, true), &reroute)
            .unwrap();
        assert_eq!(canvas.connections().len(), 1);
        assert_eq!(canvas.port(&input).unwrap().connection_count(), 1);
        assert!(!canvas.port(&first_port(&canvas, &first, true)).unwrap().is_connected());
    }

    #[test]
    fn test_reload_releases_dropped_routes() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let powerplant = canvas.add_widget(WidgetKind::Powerplants, Pos2::ZERO);
        let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
        for source in [&missile, &powerplant] {
            canvas
                .connect_to_widget(&first_port(&canvas, source, true), &reroute)
                .unwrap();
        }

        let saved = canvas.widget(&reroute).unwrap().serialized_data();
        let weapon_only = serde_json::json!({ "routes": [saved["routes"][0].clone()] });
        canvas.reload_widget_data(&reroute, &weapon_only).unwrap();

        assert_eq!(canvas.connections().len(), 1);
        assert!(!canvas.port(&first_port(&canvas, &powerplant, true)).unwrap().is_connected());
        assert!(canvas.port(&first_port(&canvas, &missile, true)).unwrap().is_connected());
        assert!(matches!(
            canvas.reload_widget_data(&WidgetId::from("nope"), &weapon_only),
            Err(NodeError::UnknownWidget(_))
        ));
    }

    #[test]
    fn test_reload_connected_loadout_in_place() {
        let mut canvas = Canvas::default();
        let first = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let second = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
        let loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);
        canvas
            .connect_to_widget(&first_port(&canvas, &first, true), &loadout)
            .unwrap();
        let slot = canvas.widget(&loadout).unwrap().core().nodes().group(WEAPON_SLOTS).unwrap().members[0].clone();

        let widget = canvas.widget_mut(&loadout).unwrap();
        let saved = widget.serialized_data();
        widget.load_serialized_data(&saved);
        let nodes = canvas.widget(&loadout).unwrap().core().nodes();
        assert_eq!(nodes.free_slots(WEAPON_SLOTS), 1);
        assert_eq!(nodes.group(WEAPON_SLOTS).unwrap().members.len(), 2);

        canvas
            .connect(&first_port(&canvas, &second, true), &slot)
            .unwrap();
        assert_eq!(canvas.connections().len(), 1);
        assert_eq!(canvas.port(&slot).unwrap().connection_count(), 1);
    }

    #[test]
    fn test_canvas_positions() {
        let mut canvas = Canvas::default();
        let factory = canvas.add_widget(WidgetKind::Factories, Pos2::new(100.0, 50.0));
        let output = first_port(&canvas, &factory, true);
        assert_eq!(canvas.port_canvas_position(&output), Some(Pos2::new(418.0, 165.0)));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut canvas = Canvas::default();
        let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::new(10.0, 20.0));
        let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::new(400.0, 20.0));
        let weapon = first_port(&canvas, &missile, true);
        canvas.connect_to_widget(&weapon, &reroute).unwrap();
        canvas.set_minimized(&missile, true).unwrap();

        let saved = canvas.save();
        let json = serde_json::to_string(&saved).unwrap();
        drop(canvas);

        let restored = Canvas::from_json(&json, EngineConfig::default()).unwrap();
        let again = restored.save();
        assert_eq!(again.version, "1.0");
        assert_eq!(again.metadata.created, saved.metadata.created);
        assert_eq!(again.widgets, saved.widgets);
        assert_eq!(again.connections, saved.connections);
        assert!(restored.widget(&missile).unwrap().core().minimized);
    }

    #[test]
    fn test_load_skips_stale_records() {
        let mut canvas = Canvas::default();
        canvas.add_widget(WidgetKind::Powerplants, Pos2::ZERO);
        let mut snapshot = canvas.save();
        snapshot.connections.push(ConnectionRecord {
            source_node_id: PortId::from("ghost-out"),
            target_node_id: PortId::from("ghost-in"),
        });
        let skipped = canvas.load(&snapshot);
        assert_eq!(skipped.len(), 1);
        assert!(canvas.connections().is_empty());
        assert_eq!(canvas.widgets().count(), 1);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Canvas::from_json("{}", EngineConfig::default()),
            Err(NodeError::Json(_))
        ));
    }
}
