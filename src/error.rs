//! Error type for fallible boundary operations
//!
//! Node, group and route operations never fail; they report absence with
//! `Option`. Connecting ports and loading configuration or snapshots can.

use crate::nodes::ids::{ConnectionId, PortId, WidgetId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("unknown port {0}")]
    UnknownPort(PortId),

    #[error("unknown widget {0}")]
    UnknownWidget(WidgetId),

    #[error("cannot connect port {0} to itself")]
    SelfConnection(PortId),

    #[error("ports {0} and {1} belong to the same widget")]
    SameWidget(PortId, PortId),

    #[error("ports {0} and {1} have the same direction")]
    SameDirection(PortId, PortId),

    #[error("connection {0} already exists")]
    DuplicateConnection(ConnectionId),

    #[error("port types `{0}` and `{1}` are not compatible")]
    IncompatibleTypes(String, String),

    #[error("widget {0} has no port accepting `{1}`")]
    NoCompatiblePort(WidgetId, String),

    #[error("unknown widget kind `{0}`")]
    UnknownWidgetKind(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type NodeResult<T> = Result<T, NodeError>;
