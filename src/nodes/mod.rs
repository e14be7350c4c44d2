//! Node system - ports, layout and connection bookkeeping

// Core node system modules
pub mod connections;
pub mod group;
pub mod ids;
pub mod layout;
pub mod node_set;
pub mod port;
pub mod registry;

// Re-export core types
pub use connections::{CompatibilityRules, Connection, ConnectionRecord, ConnectionRegistry};
pub use group::{ExpandableGroup, GroupConfig, GroupSnapshot, LabelFormat};
pub use ids::{ConnectionId, PortId, WidgetId};
pub use layout::{AnchorRegion, LayoutAnchors, LayoutMetrics};
pub use node_set::NodeSet;
pub use port::{Port, PortDirection, PortOptions};
pub use registry::NodeRegistryHandle;
