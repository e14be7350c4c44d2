//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Widget geometry defaults
pub mod widget {
    /// Default widget width in pixels
    pub const DEFAULT_WIDTH: f32 = 300.0;

    /// Default widget height in pixels
    pub const DEFAULT_HEIGHT: f32 = 200.0;

    /// Prefix of generated widget ids
    pub const ID_PREFIX: &str = "widget";
}

/// Node layout metrics, in pixels
pub mod layout {
    /// Height of the widget header bar
    pub const HEADER_HEIGHT: f32 = 40.0;

    /// Gap between the header and the first node row
    pub const TOP_PADDING: f32 = 10.0;

    /// Gap between the last node row and the widget bottom
    pub const BOTTOM_PADDING: f32 = 20.0;

    /// Lower bound for the height nodes are distributed over
    pub const MIN_AVAILABLE_HEIGHT: f32 = 60.0;

    /// Minimum separation between nodes in the same column and anchor
    pub const DEFAULT_MIN_SPACING: f32 = 28.0;

    /// Distance between the widget edge and a port
    pub const EDGE_OFFSET: f32 = 12.0;

    /// Rendered port diameter
    pub const PORT_SIZE: f32 = 12.0;
}

/// Expandable node group defaults
pub mod group {
    /// Default base label for group slots
    pub const DEFAULT_BASE_LABEL: &str = "Connection";

    /// Default cap on simultaneously free slots
    pub const DEFAULT_MAX_FREE: usize = 2;

    /// A group never shrinks below this many slots
    pub const MIN_AVAILABLE: usize = 1;
}

/// Reroute widget text
pub mod routes {
    /// Section that holds route ports and the route list
    pub const SECTION_ID: &str = "routes";

    /// Row shown when no route exists yet
    pub const PLACEHOLDER: &str = "Drag a connection into this widget to add ports";

    /// Label used when a route type is empty
    pub const FALLBACK_LABEL: &str = "Route";
}

/// Persistence metadata
pub mod snapshot {
    /// Snapshot format version
    pub const VERSION: &str = "1.0";

    /// Creator tag written into snapshot metadata
    pub const CREATOR: &str = "fleetwright 0.1";

    /// Environment variable that points at a config file
    pub const CONFIG_ENV: &str = "FLEETWRIGHT_CONFIG";
}
