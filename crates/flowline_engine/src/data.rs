//! Data passed into and out of node executors.

use flowline_graph::connection::DEFAULT_PORT;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// InputData
// ─────────────────────────────────────────────────────────────────────────────

/// Upstream data collected for one node, keyed by input port.
///
/// Each incoming connection whose source produced output contributes one
/// value to its port. A port fed by several connections keeps every value,
/// in connection order.
///
/// Equality compares the delivered data only, not the default port name,
/// which is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputData {
    ports: IndexMap<String, Vec<Value>>,
    #[serde(skip)]
    default_port: Option<String>,
}

impl PartialEq for InputData {
    fn eq(&self, other: &Self) -> bool {
        self.ports == other.ports
    }
}

impl Default for InputData {
    fn default() -> Self {
        Self::new()
    }
}

impl InputData {
    /// Creates empty input using the standard default port.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ports: IndexMap::new(),
            default_port: None,
        }
    }

    /// Creates empty input with a custom default port name.
    #[must_use]
    pub fn with_default_port(port: impl Into<String>) -> Self {
        Self {
            ports: IndexMap::new(),
            default_port: Some(port.into()),
        }
    }

    /// Creates input holding a single value on the default port.
    #[must_use]
    pub fn single(value: Value) -> Self {
        let mut input = Self::new();
        input.push(DEFAULT_PORT, value);
        input
    }

    /// Returns the name of the default port.
    #[must_use]
    pub fn default_port(&self) -> &str {
        self.default_port.as_deref().unwrap_or(DEFAULT_PORT)
    }

    /// Appends a value to a port.
    pub fn push(&mut self, port: impl Into<String>, value: Value) {
        self.ports.entry(port.into()).or_default().push(value);
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, port: impl Into<String>, value: Value) -> Self {
        self.push(port, value);
        self
    }

    /// Returns true if no port received anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Returns the port names that received data, in arrival order.
    pub fn ports(&self) -> impl Iterator<Item = &str> {
        self.ports.keys().map(String::as_str)
    }

    /// Returns every value delivered to a port.
    #[must_use]
    pub fn all(&self, port: &str) -> &[Value] {
        self.ports
            .get(port)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the first value delivered to a port.
    #[must_use]
    pub fn get(&self, port: &str) -> Option<&Value> {
        self.all(port).first()
    }

    /// Returns a port's data as one value.
    ///
    /// A single value is returned as is; several values are gathered into
    /// an array in arrival order.
    #[must_use]
    pub fn merged(&self, port: &str) -> Option<Value> {
        match self.all(port) {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(Value::Array(many.to_vec())),
        }
    }

    /// Returns the default port's data as one value.
    #[must_use]
    pub fn primary(&self) -> Option<Value> {
        self.merged(self.default_port())
    }

    /// Returns a port's data as a flat list of rows.
    ///
    /// Arrays contribute their elements, other values count as one row and
    /// nulls are dropped.
    #[must_use]
    pub fn rows(&self, port: &str) -> Vec<Value> {
        let mut rows = Vec::new();
        for value in self.all(port) {
            match value {
                Value::Array(items) => rows.extend(items.iter().cloned()),
                Value::Null => {}
                other => rows.push(other.clone()),
            }
        }
        rows
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeOutput
// ─────────────────────────────────────────────────────────────────────────────

/// What an executor produces for one node.
///
/// `data` is the primary output read by untagged connections. A node with
/// several distinct outputs (a condition's `"true"` and `"false"`) adds them
/// as tagged `branches`; a tagged connection reads the branch with its tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeOutput {
    /// Primary output.
    pub data: Value,
    /// Short human-readable summary of what the node did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Tagged outputs, in emission order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub branches: IndexMap<String, Value>,
}

impl NodeOutput {
    /// Creates an output with the given primary data.
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            data,
            summary: None,
            branches: IndexMap::new(),
        }
    }

    /// Creates an output holding an empty object.
    #[must_use]
    pub fn empty_object() -> Self {
        Self::new(Value::Object(Map::new()))
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Adds a tagged output.
    #[must_use]
    pub fn with_branch(mut self, tag: impl Into<String>, data: Value) -> Self {
        self.branches.insert(tag.into(), data);
        self
    }

    /// Returns the data a connection tagged `tag` carries.
    ///
    /// Nodes without tagged outputs hand their primary output to every
    /// connection. Nodes with tagged outputs only feed matching tags.
    #[must_use]
    pub fn value_for(&self, tag: &str) -> Option<&Value> {
        if self.branches.is_empty() {
            Some(&self.data)
        } else {
            self.branches.get(tag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merged_gathers_multiple_values() {
        let input = InputData::new()
            .with("input", json!({ "a": 1 }))
            .with("input", json!({ "b": 2 }));

        assert_eq!(input.primary(), Some(json!([{ "a": 1 }, { "b": 2 }])));
        assert_eq!(input.get("input"), Some(&json!({ "a": 1 })));
        assert_eq!(input.merged("missing"), None);
    }

    #[test]
    fn rows_flatten_arrays_and_skip_nulls() {
        let input = InputData::new()
            .with("A", json!([{ "id": 1 }, { "id": 2 }]))
            .with("A", Value::Null)
            .with("A", json!({ "id": 3 }));

        assert_eq!(
            input.rows("A"),
            vec![json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })]
        );
        assert!(input.rows("B").is_empty());
    }

    #[test]
    fn custom_default_port() {
        let input = InputData::with_default_port("in").with("in", json!(5));
        assert_eq!(input.default_port(), "in");
        assert_eq!(input.primary(), Some(json!(5)));
    }

    #[test]
    fn untagged_output_feeds_every_tag() {
        let output = NodeOutput::new(json!([1, 2]));
        assert_eq!(output.value_for("true"), Some(&json!([1, 2])));
    }

    #[test]
    fn tagged_output_feeds_matching_tag_only() {
        let output = NodeOutput::new(json!([1, 2]))
            .with_branch("true", json!([2]))
            .with_branch("false", json!([1]));

        assert_eq!(output.value_for("true"), Some(&json!([2])));
        assert_eq!(output.value_for("false"), Some(&json!([1])));
        assert_eq!(output.value_for("A"), None);
    }

    #[test]
    fn input_serializes_as_port_map() {
        let input = InputData::single(json!({ "x": 1 }));
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({ "input": [{ "x": 1 }] })
        );
    }
}
