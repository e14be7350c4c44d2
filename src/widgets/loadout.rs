//! Loadout widget: a class input, expandable craft and weapon slots, a hull output
//!
//! All ports pin to the configuration section. The slot groups are saved with
//! their port ids so external connections resolve after a reload.

use super::core::{ListItem, SummaryPanel, WidgetCore};
use super::{parse_data, parse_entries, Widget};
use crate::nodes::group::{GroupConfig, GroupSnapshot, LabelFormat};
use crate::nodes::port::{PortDirection, PortOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONFIG_SECTION: &str = "config";
const ITEMS_LIST: &str = "items";
pub const CRAFT_SLOTS: &str = "craft-slots";
pub const WEAPON_SLOTS: &str = "weapon-slots";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadoutData {
    pub name: String,
    pub items: Vec<String>,
}

impl Default for LoadoutData {
    fn default() -> Self {
        Self {
            name: "New Loadout".to_string(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoadoutPayload {
    #[serde(flatten)]
    data: LoadoutData,
    groups: Vec<GroupSnapshot>,
}

#[derive(Debug)]
pub struct LoadoutWidget {
    core: WidgetCore,
    data: LoadoutData,
}

impl LoadoutWidget {
    pub fn new(core: WidgetCore) -> Self {
        Self {
            core,
            data: LoadoutData::default(),
        }
    }

    pub fn data(&self) -> &LoadoutData {
        &self.data
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = name.into();
        self.update_title();
    }

    pub fn add_item(&mut self, item: impl Into<String>) {
        self.data.items.push(item.into());
        self.update_items_list();
    }

    fn update_title(&mut self) {
        let title = if self.data.name.is_empty() {
            self.core.kind.default_title().to_string()
        } else {
            self.data.name.clone()
        };
        self.core.set_title(title);
    }

    fn update_items_list(&mut self) {
        let items = self
            .data
            .items
            .iter()
            .map(|item| ListItem::new(item.as_str(), ""))
            .collect();
        self.core.set_list(ITEMS_LIST, items);
    }

    fn slot_group(base_label: &str, node_type: &str, offset: f32) -> GroupConfig {
        GroupConfig::new(PortDirection::Input, node_type)
            .labeled(base_label, LabelFormat::BareFirst)
            .in_section(CONFIG_SECTION)
            .with_anchor(CONFIG_SECTION, offset)
            .with_min_spacing(28.0)
            .with_max_free(2)
    }
}

impl Widget for LoadoutWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn create_content(&mut self) {
        self.core.create_section(CONFIG_SECTION, "Configuration", 110.0);
        self.update_items_list();
    }

    fn create_nodes(&mut self) {
        self.core.clear_nodes();
        self.core.add_node(
            PortDirection::Input,
            "loadout",
            "Class",
            0.0,
            0.2,
            PortOptions::new()
                .in_section(CONFIG_SECTION)
                .with_anchor(CONFIG_SECTION, 0.0),
        );
        self.core
            .create_expandable_group(CRAFT_SLOTS, Self::slot_group("Craft", "craft", 32.0));
        self.core
            .create_expandable_group(WEAPON_SLOTS, Self::slot_group("Weapon", "weapon", 64.0));
        self.core.add_node(
            PortDirection::Output,
            "loadout-hull",
            "Hull",
            1.0,
            0.45,
            PortOptions::new()
                .in_section(CONFIG_SECTION)
                .with_anchor(CONFIG_SECTION, 0.0)
                .multiple(true),
        );
    }

    fn serialized_data(&self) -> Value {
        let payload = LoadoutPayload {
            data: self.data.clone(),
            groups: self.core.nodes().group_snapshots(),
        };
        serde_json::to_value(payload).unwrap_or_default()
    }

    /// Slot groups are reconciled in place, so connected slots keep their
    /// connections; a bad group entry is skipped on its own
    fn load_serialized_data(&mut self, data: &Value) {
        self.data = parse_data(self.core.kind, data);
        let groups: Vec<GroupSnapshot> = parse_entries(self.core.kind, data, "groups");
        for snapshot in &groups {
            self.core.nodes_mut().restore_group(snapshot);
        }
        self.core.reflow_nodes();
        self.update_title();
        self.update_items_list();
    }

    fn render_summary(&self, summary: Option<&mut SummaryPanel>) {
        let Some(summary) = summary else { return };
        let connected = |key: &str| {
            self.core.nodes().group(key).map_or(0, |group| {
                group.members.len() - self.core.nodes().free_slots(key)
            })
        };
        summary.set_lines([
            self.data.name.clone(),
            format!("{} items", self.data.items.len()),
            format!(
                "{} craft • {} weapons",
                connected(CRAFT_SLOTS),
                connected(WEAPON_SLOTS)
            ),
        ]);
    }
}
