//! Missile designer widget with a weapon output pinned to its design section

use super::core::{SummaryPanel, WidgetCore};
use super::{parse_data, Widget};
use crate::nodes::port::{PortDirection, PortOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MissileData {
    pub name: String,
    pub warhead: Option<String>,
    pub guidance: Option<String>,
    pub propulsion: Option<String>,
    pub ignore_tech_requirements: bool,
}

impl Default for MissileData {
    fn default() -> Self {
        Self {
            name: "New Missile".to_string(),
            warhead: None,
            guidance: None,
            propulsion: None,
            ignore_tech_requirements: false,
        }
    }
}

#[derive(Debug)]
pub struct MissileWidget {
    core: WidgetCore,
    data: MissileData,
}

impl MissileWidget {
    pub fn new(core: WidgetCore) -> Self {
        Self {
            core,
            data: MissileData::default(),
        }
    }

    pub fn data(&self) -> &MissileData {
        &self.data
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = name.into();
        self.update_title();
    }

    pub fn set_warhead(&mut self, warhead: Option<String>) {
        self.data.warhead = warhead;
    }

    fn update_title(&mut self) {
        let title = if self.data.name.is_empty() {
            self.core.kind.default_title().to_string()
        } else {
            self.data.name.clone()
        };
        self.core.set_title(title);
    }
}

impl Widget for MissileWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn create_content(&mut self) {
        self.core.create_section("design", "Missile Design", 70.0);
        self.core.create_section("stats", "Statistics", 40.0);
    }

    fn create_nodes(&mut self) {
        self.core.clear_nodes();
        self.core.add_node(
            PortDirection::Output,
            "weapon",
            "Weapon",
            1.0,
            0.4,
            PortOptions::new()
                .in_section("design")
                .with_anchor("design", 0.0)
                .multiple(true),
        );
    }

    fn serialized_data(&self) -> Value {
        serde_json::to_value(&self.data).unwrap_or_default()
    }

    fn load_serialized_data(&mut self, data: &Value) {
        self.data = parse_data(self.core.kind, data);
        self.update_title();
    }

    fn render_summary(&self, summary: Option<&mut SummaryPanel>) {
        let Some(summary) = summary else { return };
        let warhead = self.data.warhead.as_deref().unwrap_or("No warhead");
        summary.set_lines([self.data.name.clone(), warhead.to_string()]);
    }
}
