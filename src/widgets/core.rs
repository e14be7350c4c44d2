//! State shared by every widget: geometry, sections, view containers and ports
//!
//! Every mutation that changes the port set or its layout inputs reflows
//! before returning, so positions can be read back immediately.

use super::WidgetKind;
use crate::config::LayoutConfig;
use crate::nodes::group::GroupConfig;
use crate::nodes::ids::{ConnectionId, PortId, WidgetId};
use crate::nodes::layout::{self, AnchorRegion, LayoutAnchors, LayoutMetrics};
use crate::nodes::node_set::NodeSet;
use crate::nodes::port::{Port, PortDirection, PortOptions};
use crate::nodes::registry::NodeRegistryHandle;
use egui::{Pos2, Vec2};
use std::collections::BTreeMap;

/// A titled band of the widget body that ports can anchor to
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    /// Top edge relative to the widget's top edge
    pub top: f32,
    pub height: f32,
}

/// One row of a list container
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub name: String,
    pub details: String,
    pub placeholder: bool,
}

impl ListItem {
    pub fn new(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
            placeholder: false,
        }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self {
            name: text.into(),
            details: String::new(),
            placeholder: true,
        }
    }
}

/// Text shown in place of the body while a widget is minimized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryPanel {
    pub visible: bool,
    pub lines: Vec<String>,
}

impl SummaryPanel {
    pub fn set_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
    }
}

/// Text containers written by the widget; only present while mounted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetView {
    pub title: String,
    pub summary: SummaryPanel,
    pub lists: BTreeMap<String, Vec<ListItem>>,
}

#[derive(Debug)]
pub struct WidgetCore {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub title: String,
    pub position: Pos2,
    pub size: Vec2,
    pub minimized: bool,
    nodes: NodeSet,
    anchors: LayoutAnchors,
    sections: Vec<Section>,
    view: Option<WidgetView>,
    layout: LayoutConfig,
}

impl WidgetCore {
    pub fn new(
        id: WidgetId,
        kind: WidgetKind,
        registry: NodeRegistryHandle,
        layout: LayoutConfig,
    ) -> Self {
        Self {
            nodes: NodeSet::new(id.clone(), registry),
            id,
            title: kind.default_title().to_string(),
            kind,
            position: Pos2::ZERO,
            size: Vec2::new(layout.default_width, layout.default_height),
            minimized: false,
            anchors: LayoutAnchors::new(),
            sections: Vec::new(),
            view: None,
            layout,
        }
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics::compute(self.size.y, &self.layout)
    }

    // View containers

    pub fn mount(&mut self) {
        if self.view.is_none() {
            self.view = Some(WidgetView {
                title: self.title.clone(),
                ..WidgetView::default()
            });
        }
    }

    pub fn unmount(&mut self) {
        self.view = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.view.is_some()
    }

    pub fn view(&self) -> Option<&WidgetView> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut WidgetView> {
        self.view.as_mut()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        if let Some(view) = self.view.as_mut() {
            view.title = self.title.clone();
        }
    }

    /// Replaces a list container's rows; skipped when not mounted
    pub fn set_list(&mut self, key: &str, items: Vec<ListItem>) {
        if let Some(view) = self.view.as_mut() {
            view.lists.insert(key.to_string(), items);
        }
    }

    pub fn list(&self, key: &str) -> Option<&[ListItem]> {
        self.view.as_ref()?.lists.get(key).map(Vec::as_slice)
    }

    pub fn summary(&self) -> Option<&SummaryPanel> {
        self.view.as_ref().map(|view| &view.summary)
    }

    /// Detaches the summary panel so a widget can render into it while the
    /// core stays borrowable; hand it back with [`Self::put_summary`]
    pub(crate) fn take_summary(&mut self) -> Option<SummaryPanel> {
        self.view.as_mut().map(|view| std::mem::take(&mut view.summary))
    }

    pub(crate) fn put_summary(&mut self, summary: Option<SummaryPanel>) {
        if let (Some(view), Some(summary)) = (self.view.as_mut(), summary) {
            view.summary = summary;
        }
    }

    // Geometry

    pub fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.reflow_nodes();
    }

    // Sections and anchors

    /// Appends a section below the previous one and registers it as an anchor
    ///
    /// Creating an existing section returns its current region.
    pub fn create_section(&mut self, id: &str, title: &str, height: f32) -> AnchorRegion {
        if let Some(section) = self.section(id) {
            return AnchorRegion::new(section.top, section.height);
        }
        let top = self
            .sections
            .last()
            .map(|last| last.top + last.height)
            .unwrap_or_else(|| self.metrics().content_top);
        self.sections.push(Section {
            id: id.to_string(),
            title: title.to_string(),
            top,
            height,
        });
        let region = AnchorRegion::new(top, height);
        self.add_layout_anchor(id, region);
        region
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn add_layout_anchor(&mut self, id: &str, region: AnchorRegion) {
        self.anchors.add(id, region);
        self.reflow_nodes();
    }

    pub fn anchors(&self) -> &LayoutAnchors {
        &self.anchors
    }

    // Ports

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeSet {
        &mut self.nodes
    }

    pub fn port(&self, id: &PortId) -> Option<&Port> {
        self.nodes.port(id)
    }

    pub fn ports(&self) -> &[Port] {
        self.nodes.ports()
    }

    pub fn add_node(
        &mut self,
        direction: PortDirection,
        port_type: &str,
        label: impl Into<String>,
        relative_x: f32,
        relative_y: f32,
        options: PortOptions,
    ) -> Option<PortId> {
        let id = self
            .nodes
            .add_node(direction, port_type, label, relative_x, relative_y, options)?;
        self.reflow_nodes();
        Some(id)
    }

    pub fn remove_node(&mut self, id: &PortId) -> Vec<ConnectionId> {
        let released = self.nodes.remove_node(id);
        self.reflow_nodes();
        released
    }

    pub fn clear_nodes(&mut self) {
        self.nodes.clear_nodes();
    }

    pub fn create_expandable_group(&mut self, key: &str, config: GroupConfig) -> Option<PortId> {
        let first = self.nodes.create_expandable_group(key, config);
        self.reflow_nodes();
        first
    }

    /// Keeps the group owning `id` in step with its connections
    pub fn handle_group_connection_change(&mut self, id: &PortId) -> bool {
        let changed = self.nodes.handle_connection_change(id);
        if changed {
            self.reflow_nodes();
        }
        changed
    }

    pub fn reflow_nodes(&mut self) {
        layout::reflow(self.nodes.ports_mut(), self.size, &self.anchors, &self.layout);
    }

    /// Port position in canvas coordinates
    pub fn port_canvas_position(&self, id: &PortId) -> Option<Pos2> {
        self.port(id).map(|port| self.position + port.position.to_vec2())
    }
}
