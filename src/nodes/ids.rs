//! String identifiers for widgets, ports and connections

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a widget on the canvas
    WidgetId
);

string_id!(
    /// Identifier of a port, stable across save and restore
    PortId
);

string_id!(
    /// Identifier of a connection between two ports
    ConnectionId
);

impl WidgetId {
    /// Generates a fresh `widget-<uuid>` identifier
    pub fn generate() -> Self {
        Self(format!(
            "{}-{}",
            crate::constants::widget::ID_PREFIX,
            uuid::Uuid::new_v4().simple()
        ))
    }
}

impl ConnectionId {
    /// Canonical id for the connection between two ports; argument order does not matter
    pub fn between(a: &PortId, b: &PortId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("connection-{}-{}", first, second))
    }
}
