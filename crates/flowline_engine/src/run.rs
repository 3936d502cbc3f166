//! Run status and terminal run records.

use core::fmt;
use std::time::SystemTime;

use flowline_graph::{NodeId, NodeStatus};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{InputData, NodeOutput};
use crate::error::RunError;

/// Status of the engine's current (or last) run.
///
/// `Pending -> Running <-> Paused -> {Completed, Failed, Cancelled}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineStatus {
    /// No run started since construction or the last reset.
    #[default]
    Pending,
    /// A run is advancing through its schedule.
    Running,
    /// A run is held at a node boundary.
    Paused,
    /// The last run finished its schedule.
    Completed,
    /// The last run finished with fatal node errors, or its graph was invalid.
    Failed,
    /// The last run was cancelled.
    Cancelled,
}

impl EngineStatus {
    /// Returns true while a run is in flight.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, EngineStatus::Running | EngineStatus::Paused)
    }
}

impl From<RunStatus> for EngineStatus {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Completed => EngineStatus::Completed,
            RunStatus::Failed => EngineStatus::Failed,
            RunStatus::Cancelled => EngineStatus::Cancelled,
        }
    }
}

/// Terminal status stored in a run record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    /// Every scheduled node ran.
    Completed,
    /// Node errors were fatal under the failure policy.
    Failed,
    /// Cancelled or reset before the schedule finished.
    Cancelled,
}

impl RunStatus {
    /// Returns the lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of one executed node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    /// `completed` or `error`.
    pub status: NodeStatus,
    /// The node's output, absent on error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<NodeOutput>,
    /// Human-readable summary (`executionResult`), or the error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Error message when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The data the node received.
    #[serde(default)]
    pub input: InputData,
    /// Wall time spent in the executor.
    pub duration_ms: u64,
}

impl NodeResult {
    /// Returns the primary output data, if the node completed.
    #[must_use]
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.output.as_ref().map(|output| &output.data)
    }

    /// Returns true if the node completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == NodeStatus::Completed
    }
}

/// Immutable record of a finished run, as kept in history.
///
/// `node_results` holds the nodes that actually executed, in schedule
/// order. Nodes skipped by cancellation are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRun {
    /// Unique run ID.
    pub id: String,
    /// The workflow this run executed.
    pub workflow_id: String,
    /// Wall-clock start.
    pub started_at: SystemTime,
    /// Wall-clock end.
    pub finished_at: SystemTime,
    /// Terminal status.
    pub status: RunStatus,
    /// Per-node outcomes, in schedule order.
    pub node_results: IndexMap<NodeId, NodeResult>,
    /// Monotonic duration of the whole run.
    pub duration_ms: u64,
    /// Why the run did not complete cleanly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    /// Nodes excluded from the schedule because no root reaches them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreachable: Vec<NodeId>,
}

impl ExecutionRun {
    /// Returns the result of one node.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeResult> {
        self.node_results.get(&NodeId::from(id))
    }

    /// Returns the nodes that errored, in schedule order.
    #[must_use]
    pub fn failed_nodes(&self) -> Vec<&NodeId> {
        self.node_results
            .iter()
            .filter(|(_, result)| result.status == NodeStatus::Error)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn engine_status_activity() {
        assert!(EngineStatus::Running.is_active());
        assert!(EngineStatus::Paused.is_active());
        assert!(!EngineStatus::Pending.is_active());
        assert!(!EngineStatus::from(RunStatus::Cancelled).is_active());
    }

    #[test]
    fn run_record_uses_camel_case() {
        let mut node_results = IndexMap::new();
        node_results.insert(
            NodeId::from("a"),
            NodeResult {
                status: NodeStatus::Completed,
                output: Some(NodeOutput::new(json!({ "ok": true }))),
                summary: Some("done".into()),
                error: None,
                input: InputData::new(),
                duration_ms: 3,
            },
        );
        let run = ExecutionRun {
            id: "r1".into(),
            workflow_id: "wf".into(),
            started_at: SystemTime::UNIX_EPOCH,
            finished_at: SystemTime::UNIX_EPOCH,
            status: RunStatus::Completed,
            node_results,
            duration_ms: 3,
            error: None,
            unreachable: Vec::new(),
        };

        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["workflowId"], "wf");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["nodeResults"]["a"]["status"], "completed");
        assert_eq!(value["nodeResults"]["a"]["durationMs"], 3);

        let back: ExecutionRun = serde_json::from_value(value).unwrap();
        assert_eq!(back, run);
        assert!(back.node("a").unwrap().is_completed());
        assert!(back.failed_nodes().is_empty());
    }
}
