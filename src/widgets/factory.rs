//! Factory widget: consumes components, produces components

use super::core::{ListItem, SummaryPanel, WidgetCore};
use super::{parse_data, Widget};
use crate::nodes::port::{PortDirection, PortOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const PRODUCTION_LIST: &str = "production";
const EFFICIENCY_RANGE: (u32, u32) = (50, 150);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactoryData {
    pub name: String,
    pub production_lines: Vec<String>,
    /// Percent, 50 to 150
    pub efficiency: u32,
}

impl Default for FactoryData {
    fn default() -> Self {
        Self {
            name: "New Factory".to_string(),
            production_lines: Vec::new(),
            efficiency: 100,
        }
    }
}

#[derive(Debug)]
pub struct FactoryWidget {
    core: WidgetCore,
    data: FactoryData,
}

impl FactoryWidget {
    pub fn new(core: WidgetCore) -> Self {
        Self {
            core,
            data: FactoryData::default(),
        }
    }

    pub fn data(&self) -> &FactoryData {
        &self.data
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.data.name = name.into();
        self.update_title();
    }

    pub fn set_efficiency(&mut self, efficiency: u32) {
        self.data.efficiency = efficiency.clamp(EFFICIENCY_RANGE.0, EFFICIENCY_RANGE.1);
    }

    pub fn add_production_line(&mut self, line: impl Into<String>) {
        self.data.production_lines.push(line.into());
        self.update_production_list();
    }

    fn update_title(&mut self) {
        let title = if self.data.name.is_empty() {
            self.core.kind.default_title().to_string()
        } else {
            self.data.name.clone()
        };
        self.core.set_title(title);
    }

    fn update_production_list(&mut self) {
        let items = self
            .data
            .production_lines
            .iter()
            .map(|line| ListItem::new(line.as_str(), ""))
            .collect();
        self.core.set_list(PRODUCTION_LIST, items);
    }
}

impl Widget for FactoryWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn create_content(&mut self) {
        self.core.create_section("config", "Factory Configuration", 60.0);
        self.core.create_section("production", "Production Lines", 50.0);
        self.update_production_list();
    }

    fn create_nodes(&mut self) {
        self.core.add_node(
            PortDirection::Input,
            "component",
            "Components",
            0.0,
            0.5,
            PortOptions::new().in_section("production"),
        );
        self.core.add_node(
            PortDirection::Output,
            "component",
            "Products",
            1.0,
            0.5,
            PortOptions::new().in_section("production").multiple(true),
        );
    }

    fn serialized_data(&self) -> Value {
        serde_json::to_value(&self.data).unwrap_or_default()
    }

    fn load_serialized_data(&mut self, data: &Value) {
        self.data = parse_data(self.core.kind, data);
        self.update_title();
        self.update_production_list();
    }

    fn render_summary(&self, summary: Option<&mut SummaryPanel>) {
        if let Some(summary) = summary {
            summary.set_lines([
                self.data.name.clone(),
                format!("{} production lines", self.data.production_lines.len()),
                format!("Efficiency {}%", self.data.efficiency),
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::nodes::ids::WidgetId;
    use crate::nodes::registry::NodeRegistryHandle;
    use crate::widgets::WidgetKind;

    fn factory() -> FactoryWidget {
        let core = WidgetCore::new(
            WidgetId::from("f1"),
            WidgetKind::Factories,
            NodeRegistryHandle::new(),
            LayoutConfig::default(),
        );
        let mut widget = FactoryWidget::new(core);
        widget.init();
        widget
    }

    #[test]
    fn test_ports_are_declared() {
        let widget = factory();
        let ports = widget.core().ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].id.as_str(), "f1-input:component-1");
        assert_eq!(ports[1].id.as_str(), "f1-output:component-1");
        assert!(ports[1].allow_multiple_connections);
    }

    #[test]
    fn test_name_drives_title() {
        let mut widget = factory();
        widget.set_name("Orbital Works");
        assert_eq!(widget.core().title, "Orbital Works");
        widget.set_name("");
        assert_eq!(widget.core().title, "New Factory");
    }

    #[test]
    fn test_efficiency_is_clamped() {
        let mut widget = factory();
        widget.set_efficiency(400);
        assert_eq!(widget.data().efficiency, 150);
    }

    #[test]
    fn test_data_round_trip() {
        let mut widget = factory();
        widget.set_name("Orbital Works");
        widget.add_production_line("Armor Plate");
        let saved = widget.serialized_data();
        assert_eq!(saved["productionLines"][0], "Armor Plate");

        let mut restored = factory();
        restored.load_serialized_data(&saved);
        assert_eq!(restored.data(), widget.data());
        assert_eq!(restored.core().list(PRODUCTION_LIST).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut widget = factory();
        widget.load_serialized_data(&serde_json::json!({ "name": "Yard" }));
        assert_eq!(widget.data().efficiency, 100);
        assert!(widget.data().production_lines.is_empty());
    }
}
