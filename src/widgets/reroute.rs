//! Pass-through widget that relays connections of any type

use super::core::{SummaryPanel, WidgetCore};
use super::routes::{PreservedIds, RouteMultiplexer, RouteRecord};
use super::{parse_entries, Widget};
use crate::constants::routes::SECTION_ID;
use crate::nodes::connections::CompatibilityRules;
use crate::nodes::ids::PortId;
use crate::nodes::port::PortDirection;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ROUTES_SECTION_HEIGHT: f32 = 80.0;

/// Saved reroute state: the route set with its port ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerouteData {
    pub routes: Vec<RouteRecord>,
}

#[derive(Debug)]
pub struct RerouteWidget {
    core: WidgetCore,
    routes: RouteMultiplexer,
}

impl RerouteWidget {
    pub fn new(core: WidgetCore) -> Self {
        Self {
            core,
            routes: RouteMultiplexer::new(),
        }
    }

    pub fn routes(&self) -> &RouteMultiplexer {
        &self.routes
    }

    pub fn configure_for_node_type(
        &mut self,
        node_type: &str,
        preserved: Option<&PreservedIds>,
    ) -> Option<RouteRecord> {
        self.routes
            .configure_for_node_type(&mut self.core, node_type, preserved)
    }
}

impl Widget for RerouteWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn create_content(&mut self) {
        self.core.create_section(SECTION_ID, "Routes", ROUTES_SECTION_HEIGHT);
        self.routes.update_route_display(&mut self.core);
    }

    // Routes appear lazily as connections arrive
    fn create_nodes(&mut self) {}

    fn serialized_data(&self) -> Value {
        let data = RerouteData {
            routes: self.routes.routes().to_vec(),
        };
        serde_json::to_value(data).unwrap_or_default()
    }

    /// Routes already live with the saved ids keep their connections; routes
    /// missing from `data` are dropped and their connections released
    fn load_serialized_data(&mut self, data: &Value) {
        let records: Vec<RouteRecord> = parse_entries::<RouteRecord>(self.core.kind, data, "routes")
            .into_iter()
            .filter(|record| !record.node_type.is_empty())
            .collect();
        let released = self.routes.restore(&mut self.core, &records);
        if !released.is_empty() {
            debug!("Widget {} released {} route connection(s)", self.core.id, released.len());
        }
        if self.core.minimized {
            self.refresh_summary();
        }
    }

    fn render_summary(&self, summary: Option<&mut SummaryPanel>) {
        let Some(summary) = summary else { return };
        if self.routes.is_empty() {
            summary.set_lines(["No routes"]);
            return;
        }
        let rows = self.routes.route_display(self.core.nodes());
        summary.set_lines(rows.into_iter().map(|row| format!("{}: {}", row.name, row.details)));
    }

    fn handle_node_connection_change(&mut self, port: &PortId) {
        self.core.handle_group_connection_change(port);
        self.routes.update_route_display(&mut self.core);
        if self.core.minimized {
            self.refresh_summary();
        }
    }

    /// Any type is accepted; a drop configures the route for it
    fn accept_drop(
        &mut self,
        source_type: &str,
        source_direction: PortDirection,
        _rules: &CompatibilityRules,
    ) -> Option<PortId> {
        let route = self.configure_for_node_type(source_type, None)?;
        Some(match source_direction {
            PortDirection::Output => route.input_id,
            PortDirection::Input => route.output_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::constants::routes::PLACEHOLDER;
    use crate::nodes::ids::{ConnectionId, WidgetId};
    use crate::nodes::registry::NodeRegistryHandle;
    use crate::widgets::WidgetKind;

    fn reroute(registry: &NodeRegistryHandle) -> RerouteWidget {
        let core = WidgetCore::new(
            WidgetId::from("r1"),
            WidgetKind::Reroute,
            registry.clone(),
            LayoutConfig::default(),
        );
        let mut widget = RerouteWidget::new(core);
        widget.init();
        widget
    }

    #[test]
    fn test_starts_with_placeholder() {
        let widget = reroute(&NodeRegistryHandle::new());
        assert!(widget.core().ports().is_empty());
        let rows = widget.core().list(SECTION_ID).unwrap();
        assert_eq!(rows[0].name, PLACEHOLDER);
        assert!(rows[0].placeholder);
    }

    #[test]
    fn test_drop_configures_route() {
        let mut widget = reroute(&NodeRegistryHandle::new());
        let rules = CompatibilityRules::default();
        let input = widget
            .accept_drop("weapon", PortDirection::Output, &rules)
            .unwrap();
        let output = widget
            .accept_drop("weapon", PortDirection::Input, &rules)
            .unwrap();
        let route = widget.routes().route("weapon").unwrap();
        assert_eq!(route.input_id, input);
        assert_eq!(route.output_id, output);
    }

    #[test]
    fn test_round_trip_restores_ids() {
        let source_registry = NodeRegistryHandle::new();
        let mut source = reroute(&source_registry);
        source.configure_for_node_type("weapon", None);
        source.configure_for_node_type("power", None);
        let saved = source.serialized_data();
        drop(source);

        let mut restored = reroute(&source_registry);
        restored.load_serialized_data(&saved);
        assert_eq!(restored.serialized_data(), saved);
        assert_eq!(restored.routes().len(), 2);
    }

    #[test]
    fn test_malformed_data_leaves_no_routes() {
        let mut widget = reroute(&NodeRegistryHandle::new());
        widget.load_serialized_data(&serde_json::json!({ "routes": "weapon" }));
        assert!(widget.routes().is_empty());
        widget.load_serialized_data(&serde_json::json!({ "routes": [{ "nodeType": "" , "inputId": "a", "outputId": "b" }] }));
        assert!(widget.routes().is_empty());
    }

    #[test]
    fn test_bad_route_entry_keeps_the_others() {
        let mut widget = reroute(&NodeRegistryHandle::new());
        let data = serde_json::json!({
            "routes": [
                { "nodeType": "weapon", "inputId": "saved-in", "outputId": "saved-out" },
                null,
                { "nodeType": "power" }
            ]
        });
        widget.load_serialized_data(&data);
        assert_eq!(widget.routes().len(), 1);
        let route = widget.routes().route("weapon").unwrap();
        assert_eq!(route.input_id, PortId::from("saved-in"));
        assert_eq!(route.output_id, PortId::from("saved-out"));
    }

    #[test]
    fn test_reload_in_place_keeps_connections() {
        let mut widget = reroute(&NodeRegistryHandle::new());
        let route = widget.configure_for_node_type("weapon", None).unwrap();
        widget
            .core_mut()
            .nodes_mut()
            .attach_connection(&route.input_id, ConnectionId::from("c1"));
        let saved = widget.serialized_data();

        widget.load_serialized_data(&saved);
        assert_eq!(widget.serialized_data(), saved);
        assert!(widget.core().port(&route.input_id).unwrap().is_connected());
        assert_eq!(widget.core().list(SECTION_ID).unwrap()[0].details, "1 in • 0 out");
        assert!(widget.core_mut().nodes_mut().take_released().is_empty());

        widget.load_serialized_data(&serde_json::json!({ "routes": [] }));
        assert!(widget.routes().is_empty());
        assert_eq!(
            widget.core_mut().nodes_mut().take_released(),
            vec![ConnectionId::from("c1")]
        );
    }

    #[test]
    fn test_minimized_summary_lists_routes() {
        let mut widget = reroute(&NodeRegistryHandle::new());
        widget.configure_for_node_type("weapon", None);
        widget.set_minimized(true);
        assert_eq!(
            widget.core().summary().unwrap().lines,
            vec!["Weapon: 0 in • 0 out".to_string()]
        );
    }
}
