//! Error types for workflow execution.

use flowline_graph::GraphError;
use flowline_graph::NodeId;
use flowline_graph::condition::ConditionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a node executor.
///
/// The engine records the message as the node's result and continues with
/// the rest of the schedule; it never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The executor ran and failed.
    #[error("{0}")]
    Failed(String),

    /// The node's configuration is unusable for this executor.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The collected input has a shape this executor cannot handle.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ExecutorError {
    /// Creates a [`Failed`](Self::Failed) error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Creates an [`InvalidConfig`](Self::InvalidConfig) error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates an [`InvalidInput`](Self::InvalidInput) error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<ConditionError> for ExecutorError {
    fn from(err: ConditionError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Per-node failure. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// No executor is registered for the node's type.
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// The executor returned an error.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Errors returned synchronously by [`WorkflowEngine::start`](crate::WorkflowEngine::start).
///
/// Nothing has executed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The workflow graph failed structural validation.
    #[error("invalid workflow graph: {0}")]
    Graph(#[from] GraphError),

    /// The engine is already running (or pausing) a run.
    #[error("a run is already in progress")]
    AlreadyRunning,
}

/// Why a finished run did not complete cleanly. Stored in the run record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RunError {
    /// The run was cancelled or reset before the schedule finished.
    #[error("run aborted")]
    Aborted,

    /// One or more nodes errored and the failure policy made that fatal.
    #[error("{} node(s) failed: {}", .nodes.len(), join_ids(.nodes))]
    NodesFailed {
        /// The failed nodes, in schedule order.
        nodes: Vec<NodeId>,
    },
}

fn join_ids(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
