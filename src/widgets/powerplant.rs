//! Powerplant widget: a single power output and a performance summary

use super::core::{SummaryPanel, WidgetCore};
use super::{parse_data, Widget};
use crate::nodes::port::{PortDirection, PortOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PowerplantData {
    pub name: String,
    pub reactor_type: String,
    /// Megawatts
    pub output: u32,
    pub ignore_tech_requirements: bool,
}

impl Default for PowerplantData {
    fn default() -> Self {
        Self {
            name: "New Powerplant".to_string(),
            reactor_type: "fusion".to_string(),
            output: 1000,
            ignore_tech_requirements: false,
        }
    }
}

#[derive(Debug)]
pub struct PowerplantWidget {
    core: WidgetCore,
    data: PowerplantData,
}

impl PowerplantWidget {
    pub fn new(core: WidgetCore) -> Self {
        Self {
            core,
            data: PowerplantData::default(),
        }
    }

    pub fn data(&self) -> &PowerplantData {
        &self.data
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = name.into();
        let title = if self.data.name.is_empty() {
            self.core.kind.default_title().to_string()
        } else {
            self.data.name.clone()
        };
        self.core.set_title(title);
    }

    pub fn set_reactor(&mut self, reactor_type: impl Into<String>, output: u32) {
        self.data.reactor_type = reactor_type.into();
        self.data.output = output;
        if self.core.minimized {
            self.refresh_summary();
        }
    }
}

impl Widget for PowerplantWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn create_content(&mut self) {
        self.core.create_section("design", "Powerplant Design", 70.0);
        self.core.create_section("stats", "Performance", 40.0);
    }

    fn create_nodes(&mut self) {
        self.core.add_node(
            PortDirection::Output,
            "power",
            "Power Output",
            1.0,
            0.5,
            PortOptions::new().in_section("stats").multiple(true),
        );
    }

    fn serialized_data(&self) -> Value {
        serde_json::to_value(&self.data).unwrap_or_default()
    }

    fn load_serialized_data(&mut self, data: &Value) {
        let data: PowerplantData = parse_data(self.core.kind, data);
        let name = data.name.clone();
        self.data = data;
        self.set_name(name);
    }

    fn render_summary(&self, summary: Option<&mut SummaryPanel>) {
        if let Some(summary) = summary {
            summary.set_lines([
                self.data.name.clone(),
                format!("{} reactor", self.data.reactor_type),
                format!("Power Output: {} MW", self.data.output),
            ]);
        }
    }
}
