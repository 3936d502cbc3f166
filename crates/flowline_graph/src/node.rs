//! Node types for workflow graphs.
//!
//! Nodes are the vertices of a workflow: units of work tagged with the
//! executor kind that handles them and carrying an opaque configuration
//! payload.

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique identifier for a node in the graph.
///
/// Node IDs are opaque strings supplied by the host and stable for the
/// lifetime of the graph. Internally uses `Arc<str>` for cheap cloning
/// (reference count bump only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Creates a node ID from a string value.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Per-run status of a node.
///
/// Reset to [`Idle`](NodeStatus::Idle) when a run starts and mutated only by
/// the engine while the run progresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeStatus {
    /// Not executed in the current run (yet).
    #[default]
    Idle,
    /// The node's executor is in flight.
    Running,
    /// The executor returned an output.
    Completed,
    /// The executor failed or no executor was registered for the node kind.
    Error,
}

impl NodeStatus {
    /// Returns true for the two terminal per-node states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::Error)
    }

    /// Returns the lowercase wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Running => "running",
            NodeStatus::Completed => "completed",
            NodeStatus::Error => "error",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the workflow graph.
///
/// `kind` selects the executor that runs the node (serialized as `type`).
/// `config` is an opaque payload handed to that executor; the graph and the
/// scheduler never inspect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Executor kind, e.g. `"condition"` or `"httpRequest"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable display name.
    #[serde(default)]
    pub label: String,
    /// Kind-specific settings.
    #[serde(default = "empty_config")]
    pub config: Value,
}

fn empty_config() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Node {
    /// Creates a node with an empty configuration. The label defaults to the id.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.to_string(),
            id,
            kind: kind.into(),
            config: empty_config(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the kind-specific configuration.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Looks up a top-level configuration entry.
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Looks up a top-level configuration entry as a string.
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config_value(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_deserializes_wire_shape() {
        let node: Node = serde_json::from_value(json!({
            "id": "n1",
            "type": "condition",
            "label": "Check status",
            "config": { "conditionField": "status" }
        }))
        .unwrap();

        assert_eq!(node.id, NodeId::from("n1"));
        assert_eq!(node.kind, "condition");
        assert_eq!(node.config_str("conditionField"), Some("status"));
    }

    #[test]
    fn missing_config_defaults_to_empty_object() {
        let node: Node = serde_json::from_value(json!({ "id": "n1", "type": "trigger" })).unwrap();
        assert!(node.config.as_object().is_some_and(serde_json::Map::is_empty));
        assert!(node.label.is_empty());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_value(NodeStatus::Completed).unwrap(),
            json!("completed")
        );
        assert!(NodeStatus::Error.is_terminal());
        assert!(!NodeStatus::Running.is_terminal());
    }
}
