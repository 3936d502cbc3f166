//! Connection types for workflow graphs.
//!
//! Connections are directed data edges between nodes. A connection may carry
//! one of several named outputs of its source (for example the `"true"` and
//! `"false"` outputs of a condition node) and may feed a named input port of
//! its destination (for example the `A`/`B` inputs of a join node).

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Port name used when a connection does not name a destination port.
pub const DEFAULT_PORT: &str = "input";

/// Unique identifier for a connection in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Arc<str>);

impl ConnectionId {
    /// Creates a connection ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A directed data edge: `from` -> `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: ConnectionId,
    /// Source node ID.
    #[serde(rename = "fromNodeId")]
    pub from: NodeId,
    /// Destination node ID.
    #[serde(rename = "toNodeId")]
    pub to: NodeId,
    /// Which of the source's tagged outputs this edge carries.
    /// `None` means the source's only (primary) output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    /// Which named input slot of the destination this edge feeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<String>,
}

impl Connection {
    /// Creates an untagged connection between two nodes.
    #[must_use]
    pub fn new(id: impl Into<ConnectionId>, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            output_type: None,
            to_port: None,
        }
    }

    /// Tags the connection with one of the source's named outputs.
    #[must_use]
    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = Some(output_type.into());
        self
    }

    /// Routes the connection into a named input port of the destination.
    #[must_use]
    pub fn with_to_port(mut self, port: impl Into<String>) -> Self {
        self.to_port = Some(port.into());
        self
    }

    /// Returns the destination port this connection feeds.
    #[must_use]
    pub fn port(&self) -> &str {
        self.to_port.as_deref().unwrap_or(DEFAULT_PORT)
    }
}
