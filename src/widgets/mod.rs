//! Widget system - the contract every widget implements and the concrete widgets
//!
//! A widget owns a [`WidgetCore`] and fills it in `create_content` and
//! `create_nodes`. Everything else (minimize, envelope round-trip, group
//! upkeep on connection changes) is provided on top of those hooks.

pub mod core;
pub mod factory;
pub mod loadout;
pub mod missile;
pub mod powerplant;
pub mod reroute;
pub mod routes;

pub use self::core::{ListItem, Section, SummaryPanel, WidgetCore, WidgetView};
pub use factory::FactoryWidget;
pub use loadout::LoadoutWidget;
pub use missile::MissileWidget;
pub use powerplant::PowerplantWidget;
pub use reroute::RerouteWidget;
pub use routes::{format_node_type, PreservedIds, RouteMultiplexer, RouteRecord};

use crate::config::LayoutConfig;
use crate::error::NodeError;
use crate::nodes::connections::CompatibilityRules;
use crate::nodes::ids::{PortId, WidgetId};
use crate::nodes::port::{Port, PortDirection};
use crate::nodes::registry::NodeRegistryHandle;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Widget types known to the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Reroute,
    Factories,
    Missiles,
    Loadouts,
    Powerplants,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 5] = [
        WidgetKind::Reroute,
        WidgetKind::Factories,
        WidgetKind::Missiles,
        WidgetKind::Loadouts,
        WidgetKind::Powerplants,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Reroute => "reroute",
            WidgetKind::Factories => "factories",
            WidgetKind::Missiles => "missiles",
            WidgetKind::Loadouts => "loadouts",
            WidgetKind::Powerplants => "powerplants",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            WidgetKind::Reroute => "Reroute",
            WidgetKind::Factories => "New Factory",
            WidgetKind::Missiles => "New Missile",
            WidgetKind::Loadouts => "New Loadout",
            WidgetKind::Powerplants => "New Powerplant",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NodeError::UnknownWidgetKind(s.to_string()))
    }
}

/// Persisted form of a widget: geometry plus its own data payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetEnvelope {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub title: String,
    pub id: WidgetId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub data: Value,
}

/// Capabilities every widget provides
///
/// Only the core accessors, content/node creation and the data round-trip are
/// required; the remaining hooks default to no-ops.
pub trait Widget: fmt::Debug {
    fn core(&self) -> &WidgetCore;

    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Builds sections and other layout anchors
    fn create_content(&mut self);

    /// Declares the widget's fixed or initial ports
    fn create_nodes(&mut self);

    /// Widget-specific state, including what is needed to rebuild port ids
    fn serialized_data(&self) -> Value;

    /// Inverse of [`Widget::serialized_data`]; missing fields fall back to defaults
    fn load_serialized_data(&mut self, data: &Value);

    /// Writes the minimized projection of the widget's state
    ///
    /// `summary` is `None` when the widget is not mounted.
    fn render_summary(&self, _summary: Option<&mut SummaryPanel>) {}

    fn on_minimize_state_changed(&mut self, _minimized: bool) {}

    /// Called after a connection touching `port` was added or removed
    fn handle_node_connection_change(&mut self, port: &PortId) {
        self.core_mut().handle_group_connection_change(port);
    }

    /// Widget-specific compatibility between one of its ports and a remote type
    ///
    /// `None` defers to the configured rules.
    fn accepts_connection(&self, _local: &Port, _remote_type: &str) -> Option<bool> {
        None
    }

    /// Picks the port a connection dropped onto the widget body should land on
    ///
    /// Compatible ports with room for another connection win over occupied
    /// single-connection ports; ties go to registration order.
    fn accept_drop(
        &mut self,
        source_type: &str,
        source_direction: PortDirection,
        rules: &CompatibilityRules,
    ) -> Option<PortId> {
        let wanted = source_direction.opposite();
        let candidates: Vec<&Port> = self
            .core()
            .ports()
            .iter()
            .filter(|port| {
                port.direction == wanted
                    && self
                        .accepts_connection(port, source_type)
                        .unwrap_or_else(|| rules.are_compatible(&port.port_type, source_type))
            })
            .collect();
        candidates
            .iter()
            .find(|port| port.allow_multiple_connections || !port.is_connected())
            .or_else(|| candidates.first())
            .map(|port| port.id.clone())
    }

    fn id(&self) -> &WidgetId {
        &self.core().id
    }

    fn kind(&self) -> WidgetKind {
        self.core().kind
    }

    /// Mounts the view, builds content and ports, and lays them out
    fn init(&mut self) {
        self.core_mut().mount();
        self.create_content();
        self.create_nodes();
        self.core_mut().reflow_nodes();
    }

    /// Re-renders the summary panel if the widget is mounted
    fn refresh_summary(&mut self) {
        let mut summary = self.core_mut().take_summary();
        self.render_summary(summary.as_mut());
        self.core_mut().put_summary(summary);
    }

    fn set_minimized(&mut self, minimized: bool) {
        if self.core().minimized == minimized {
            return;
        }
        self.core_mut().minimized = minimized;
        if let Some(view) = self.core_mut().view_mut() {
            view.summary.visible = minimized;
            view.summary.lines.clear();
        }
        if minimized {
            self.refresh_summary();
        }
        self.on_minimize_state_changed(minimized);
        self.core_mut().reflow_nodes();
    }

    fn toggle_minimize(&mut self) {
        let minimized = !self.core().minimized;
        self.set_minimized(minimized);
    }

    fn to_envelope(&self) -> WidgetEnvelope {
        let core = self.core();
        WidgetEnvelope {
            kind: core.kind,
            title: core.title.clone(),
            id: core.id.clone(),
            x: core.position.x,
            y: core.position.y,
            width: core.size.x,
            height: core.size.y,
            minimized: core.minimized,
            data: self.serialized_data(),
        }
    }

    /// Applies a saved envelope to a freshly initialized widget
    fn restore_envelope(&mut self, envelope: &WidgetEnvelope) {
        let core = self.core_mut();
        core.set_position(Pos2::new(envelope.x, envelope.y));
        core.set_size(Vec2::new(envelope.width, envelope.height));
        self.load_serialized_data(&envelope.data);
        self.core_mut().set_title(envelope.title.clone());
        self.set_minimized(envelope.minimized);
        if envelope.minimized {
            self.refresh_summary();
        }
    }
}

/// Creates and initializes a widget of the given kind
pub fn create_widget(
    kind: WidgetKind,
    id: WidgetId,
    registry: NodeRegistryHandle,
    layout: LayoutConfig,
) -> Box<dyn Widget> {
    let core = WidgetCore::new(id, kind, registry, layout);
    let mut widget: Box<dyn Widget> = match kind {
        WidgetKind::Reroute => Box::new(RerouteWidget::new(core)),
        WidgetKind::Factories => Box::new(FactoryWidget::new(core)),
        WidgetKind::Missiles => Box::new(MissileWidget::new(core)),
        WidgetKind::Loadouts => Box::new(LoadoutWidget::new(core)),
        WidgetKind::Powerplants => Box::new(PowerplantWidget::new(core)),
    };
    widget.init();
    widget
}

/// Deserializes a widget payload, falling back to defaults when malformed
pub(crate) fn parse_data<T>(kind: WidgetKind, data: &Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    if data.is_null() {
        return T::default();
    }
    match T::deserialize(data) {
        Ok(parsed) => parsed,
        Err(error) => {
            log::warn!("Malformed {} data, using defaults: {}", kind, error);
            T::default()
        }
    }
}

/// Deserializes the array at `data[field]` entry by entry
///
/// Entries that fail to parse are skipped, so one bad record does not cost the
/// rest. A missing field yields an empty list.
pub(crate) fn parse_entries<T>(kind: WidgetKind, data: &Value, field: &str) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    let entries = match data.get(field) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            log::warn!("Malformed {} {}: expected a list, got {}", kind, field, other);
            return Vec::new();
        }
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                log::warn!("Skipping malformed {} {} entry {}: {}", kind, field, index, error);
                None
            }
        })
        .collect()
}
