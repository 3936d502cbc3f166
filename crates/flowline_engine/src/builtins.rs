//! Built-in data executors.
//!
//! Pure data node kinds that need no external I/O. HTTP, LLM and database
//! kinds are host executors and are registered by the host.

use flowline_graph::Node;
use flowline_graph::condition::{ConditionSet, FALSE_BRANCH, TRUE_BRANCH};
use serde_json::{Map, Value};

use crate::data::{InputData, NodeOutput};
use crate::error::ExecutorError;
use crate::registry::{ExecutionContext, ExecutorRegistry};

/// Port holding the left side of a join.
pub const JOIN_LEFT_PORT: &str = "A";
/// Port holding the right side of a join.
pub const JOIN_RIGHT_PORT: &str = "B";

type ExecutorResult = Result<NodeOutput, ExecutorError>;

pub(crate) fn register_all(registry: &mut ExecutorRegistry) {
    registry.register_fn("trigger", trigger);
    registry.register_fn("webhook", webhook);
    registry.register_fn("manualInput", manual_input);
    registry.register_fn("output", output);
    registry.register_fn("comment", comment);
    registry.register_fn("addField", add_field);
    registry.register_fn("join", join);
    registry.register_fn("condition", condition);
}

/// Reads a config string, treating `""` as absent.
fn config_text<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.config_str(key).filter(|text| !text.is_empty())
}

/// Reads a config value, treating `null` and `""` as absent.
fn config_present<'a>(node: &'a Node, key: &str) -> Option<&'a Value> {
    node.config_value(key)
        .filter(|value| !value.is_null() && value.as_str() != Some(""))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn field_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

fn trigger(_node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let data = input.primary().unwrap_or_else(|| Value::Object(Map::new()));
    Ok(NodeOutput::new(data).with_summary("Workflow triggered"))
}

fn webhook(node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let data = input
        .primary()
        .or_else(|| node.config_value("webhookData").cloned())
        .filter(|value| !value.is_null())
        .unwrap_or_else(|| Value::Object(Map::new()));
    let summary = format!("Webhook received {} fields", field_count(&data));
    Ok(NodeOutput::new(data).with_summary(summary))
}

fn manual_input(node: &Node, _input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let name = config_text(node, "inputVarName")
        .or_else(|| config_text(node, "variableName"))
        .unwrap_or("input")
        .to_owned();
    let value = config_present(node, "inputVarValue")
        .or_else(|| config_present(node, "variableValue"))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));

    let summary = format!("Set {name} = {}", display(&value));
    let mut data = Map::new();
    data.insert(name, value);
    Ok(NodeOutput::new(Value::Object(data)).with_summary(summary))
}

// ─────────────────────────────────────────────────────────────────────────────
// Pass-through
// ─────────────────────────────────────────────────────────────────────────────

fn output(_node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let data = input.primary().unwrap_or(Value::Null);
    Ok(NodeOutput::new(data).with_summary("Output received"))
}

fn comment(_node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let data = input.primary().unwrap_or(Value::Null);
    Ok(NodeOutput::new(data).with_summary("Comment node (no action)"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Transforms
// ─────────────────────────────────────────────────────────────────────────────

fn add_field(node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let name = config_text(node, "fieldName").unwrap_or("newField").to_owned();
    let value = node
        .config_value("fieldValue")
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));

    let with_field = |record: Value| -> Result<Value, ExecutorError> {
        match record {
            Value::Object(mut map) => {
                map.insert(name.clone(), value.clone());
                Ok(Value::Object(map))
            }
            other => Err(ExecutorError::invalid_input(format!(
                "addField expects objects, got {other}"
            ))),
        }
    };

    match input.primary() {
        Some(Value::Array(records)) => {
            let count = records.len();
            let data = records
                .into_iter()
                .map(with_field)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(NodeOutput::new(Value::Array(data))
                .with_summary(format!("Added field '{name}' to {count} records")))
        }
        None | Some(Value::Null) => {
            let data = with_field(Value::Object(Map::new()))?;
            Ok(NodeOutput::new(data).with_summary(format!("Added field '{name}'")))
        }
        Some(record) => {
            let data = with_field(record)?;
            Ok(NodeOutput::new(data).with_summary(format!("Added field '{name}'")))
        }
    }
}

fn join(node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let left = input.rows(JOIN_LEFT_PORT);
    let right = input.rows(JOIN_RIGHT_PORT);
    let (left_len, right_len) = (left.len(), right.len());

    let key = config_text(node, "joinKey");
    let rows = match (config_text(node, "joinStrategy"), key) {
        (Some("mergeByKey"), Some(key)) => merge_by_key(left, &right, key),
        _ => left.into_iter().chain(right).collect(),
    };

    let summary = format!("Joined {left_len} + {right_len} = {} records", rows.len());
    Ok(NodeOutput::new(Value::Array(rows)).with_summary(summary))
}

/// Merges each left row with the first right row sharing `key`.
///
/// Rows without the key never match and pass through unchanged.
fn merge_by_key(left: Vec<Value>, right: &[Value], key: &str) -> Vec<Value> {
    left.into_iter()
        .map(|row| {
            let Some(wanted) = row.get(key).filter(|value| !value.is_null()) else {
                return row;
            };
            let matched = right
                .iter()
                .find(|candidate| candidate.get(key) == Some(wanted))
                .and_then(Value::as_object);

            match (row, matched) {
                (Value::Object(mut merged), Some(other)) => {
                    for (field, value) in other {
                        merged.insert(field.clone(), value.clone());
                    }
                    Value::Object(merged)
                }
                (row, _) => row,
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Branching
// ─────────────────────────────────────────────────────────────────────────────

fn condition(node: &Node, input: &InputData, _ctx: &ExecutionContext) -> ExecutorResult {
    let set = ConditionSet::from_config(&node.config)?;
    let data = input.primary().unwrap_or(Value::Null);
    let routing = set.route(&data);
    let summary = set.summarize(&routing);

    Ok(NodeOutput::new(data)
        .with_summary(summary)
        .with_branch(TRUE_BRANCH, routing.on_true)
        .with_branch(FALSE_BRANCH, routing.on_false))
}
