//! Route multiplexer for pass-through widgets
//!
//! A route is an input/output port pair of one type. Routes are created the
//! first time a type reaches the widget and are spread evenly over the
//! widget's height, input and output of a route sharing the same row.

use super::core::{ListItem, WidgetCore};
use crate::constants::routes::{FALLBACK_LABEL, PLACEHOLDER, SECTION_ID};
use crate::nodes::ids::{ConnectionId, PortId};
use crate::nodes::layout::even_fraction;
use crate::nodes::node_set::NodeSet;
use crate::nodes::port::{PortDirection, PortOptions};
use log::debug;
use serde::{Deserialize, Serialize};

/// Paired input and output ports carrying one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub node_type: String,
    pub input_id: PortId,
    pub output_id: PortId,
}

/// Port ids to reuse when a route is rebuilt from saved data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedIds {
    pub input_id: Option<PortId>,
    pub output_id: Option<PortId>,
}

impl From<&RouteRecord> for PreservedIds {
    fn from(record: &RouteRecord) -> Self {
        Self {
            input_id: Some(record.input_id.clone()),
            output_id: Some(record.output_id.clone()),
        }
    }
}

/// Display label for a type tag: dashes become spaces, words are capitalized
pub fn format_node_type(node_type: &str) -> String {
    let words: Vec<String> = node_type
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        words.join(" ")
    }
}

/// Routes of one widget, in creation order
#[derive(Debug, Clone, Default)]
pub struct RouteMultiplexer {
    routes: Vec<RouteRecord>,
}

impl RouteMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn route(&self, node_type: &str) -> Option<&RouteRecord> {
        self.routes.iter().find(|route| route.node_type == node_type)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the route for `node_type`, creating it on first use
    ///
    /// Returns `None` for an empty type or when the ports cannot be created.
    pub fn configure_for_node_type(
        &mut self,
        core: &mut WidgetCore,
        node_type: &str,
        preserved: Option<&PreservedIds>,
    ) -> Option<RouteRecord> {
        if node_type.is_empty() {
            return None;
        }
        if let Some(existing) = self.route(node_type).cloned() {
            self.update_route_positions(core);
            self.update_route_display(core);
            return Some(existing);
        }

        let label = format_node_type(node_type);
        let group = format!("reroute-{}", node_type);
        let preserved = preserved.cloned().unwrap_or_default();

        let input_id = core.add_node(
            PortDirection::Input,
            node_type,
            format!("{} In", label),
            0.0,
            0.5,
            PortOptions::new()
                .in_section(SECTION_ID)
                .in_group(group.as_str())
                .multiple(false)
                .with_id(preserved.input_id),
        )?;
        let Some(output_id) = core.add_node(
            PortDirection::Output,
            node_type,
            format!("{} Out", label),
            1.0,
            0.5,
            PortOptions::new()
                .in_section(SECTION_ID)
                .in_group(group)
                .multiple(true)
                .with_id(preserved.output_id),
        ) else {
            core.remove_node(&input_id);
            return None;
        };

        let record = RouteRecord {
            node_type: node_type.to_string(),
            input_id,
            output_id,
        };
        debug!(
            "Widget {} routes `{}` through {} -> {}",
            core.id, node_type, record.input_id, record.output_id
        );
        self.routes.push(record.clone());
        self.update_route_positions(core);
        self.update_route_display(core);
        Some(record)
    }

    /// Spreads routes evenly over the content height and reflows
    pub fn update_route_positions(&self, core: &mut WidgetCore) {
        let total = self.routes.len();
        if total == 0 {
            return;
        }
        for (index, route) in self.routes.iter().enumerate() {
            let relative_y = even_fraction(index, total);
            for id in [&route.input_id, &route.output_id] {
                if let Some(port) = core.nodes_mut().port_mut(id) {
                    port.relative_y = relative_y;
                }
            }
        }
        core.reflow_nodes();
    }

    /// Route rows with live connection counts; a placeholder row when empty
    pub fn route_display(&self, nodes: &NodeSet) -> Vec<ListItem> {
        if self.routes.is_empty() {
            return vec![ListItem::placeholder(PLACEHOLDER)];
        }
        self.routes
            .iter()
            .map(|route| {
                let count = |id: &PortId| nodes.port(id).map_or(0, |port| port.connection_count());
                ListItem::new(
                    format_node_type(&route.node_type),
                    format!("{} in • {} out", count(&route.input_id), count(&route.output_id)),
                )
            })
            .collect()
    }

    /// Rewrites the route list container; skipped when not mounted
    pub fn update_route_display(&self, core: &mut WidgetCore) {
        if !core.is_mounted() {
            return;
        }
        let items = self.route_display(core.nodes());
        core.set_list(SECTION_ID, items);
    }

    /// Reconciles the route set with saved records, in record order
    ///
    /// Routes matching a record exactly keep their ports and connections. Any
    /// other route is removed and the connections its ports held are returned.
    pub fn restore(&mut self, core: &mut WidgetCore, records: &[RouteRecord]) -> Vec<ConnectionId> {
        let (kept, dropped): (Vec<RouteRecord>, Vec<RouteRecord>) = self
            .routes
            .drain(..)
            .partition(|route| records.contains(route));
        self.routes = kept;

        let mut released = Vec::new();
        for route in dropped {
            debug!("Widget {} drops route `{}`", core.id, route.node_type);
            released.extend(core.remove_node(&route.input_id));
            released.extend(core.remove_node(&route.output_id));
        }
        for record in records {
            self.configure_for_node_type(core, &record.node_type, Some(&PreservedIds::from(record)));
        }

        let order = |route: &RouteRecord| {
            records
                .iter()
                .position(|record| record.node_type == route.node_type)
                .unwrap_or(usize::MAX)
        };
        self.routes.sort_by_key(order);
        self.update_route_positions(core);
        self.update_route_display(core);
        released
    }
}
