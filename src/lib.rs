//! Fleetwright core library
//!
//! Port layout and connection routing for fleet-design widgets: typed ports
//! with computed positions, expandable port groups, pass-through route
//! widgets, and a canvas that keeps connections between widgets consistent.

pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;
pub mod nodes;
pub mod widgets;

// Re-export commonly used types
pub use canvas::{Canvas, CanvasSnapshot, SnapshotMetadata};
pub use config::{EngineConfig, LayoutConfig};
pub use error::{NodeError, NodeResult};
pub use nodes::{
    CompatibilityRules, ConnectionId, GroupConfig, LabelFormat, NodeRegistryHandle, Port,
    PortDirection, PortId, PortOptions, WidgetId,
};
pub use widgets::{create_widget, Widget, WidgetEnvelope, WidgetKind};
