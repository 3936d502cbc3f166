//! Workflow execution for Flowline (Layer 3).
//!
//! `flowline_engine` turns a validated workflow graph into a run: it looks
//! up an executor per node kind, feeds each node the outputs of its
//! upstream neighbours, and records the outcome of every node in an
//! immutable [`ExecutionRun`].
//!
//! # Core Concepts
//!
//! - [`WorkflowEngine`] - Sequential executor with pause, resume, cancel and reset
//! - [`ExecutorRegistry`] / [`NodeExecutor`] - Node kind to behavior mapping
//! - [`HooksAPI`] - Lifecycle observers receiving [`RunEvent`]s
//! - [`HistoryStore`] - Bounded per-workflow run history
//!
//! # Failure Model
//!
//! Graph errors are returned from [`WorkflowEngine::start`] before anything
//! runs. Node errors, including unknown node kinds, are recorded on the node
//! and the run continues; [`FailurePolicy`] decides whether such a run ends
//! `failed` or `completed`.
//!
//! # Example
//!
//! ```ignore
//! use flowline_engine::prelude::*;
//! use serde_json::json;
//!
//! let mut registry = ExecutorRegistry::with_builtins();
//! registry.register_fn("count", |_node, input, _ctx| {
//!     Ok(NodeOutput::new(json!(input.rows(input.default_port()).len())))
//! });
//!
//! let engine = WorkflowEngine::builder().with_registry(registry).build();
//! let run = engine.start("wf-1", &definition, json!([{ "status": "active" }])).await?;
//!
//! for (node, result) in &run.node_results {
//!     println!("{node}: {:?}", result.status);
//! }
//! ```

mod builtins;

/// Engine settings.
pub mod config;

/// Run control signals.
pub mod control;

/// Node input and output data.
pub mod data;

/// Error types.
pub mod error;

/// The workflow engine.
pub mod executor;

/// Bounded run history.
pub mod history;

/// Run lifecycle hooks.
pub mod hooks;

/// Executor contract and registry.
pub mod registry;

/// Run status and records.
pub mod run;

pub use builtins::{JOIN_LEFT_PORT, JOIN_RIGHT_PORT};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::{DEFAULT_HISTORY_CAPACITY, EngineConfig, FailurePolicy};
    pub use crate::control::ControlSignal;
    pub use crate::data::{InputData, NodeOutput};
    pub use crate::error::{EngineError, ExecutorError, NodeError, RunError};
    pub use crate::executor::{EngineBuilder, WorkflowEngine};
    pub use crate::history::{ExecutionHistory, HistoryError, HistorySnapshot, HistoryStore};
    pub use crate::hooks::points::{
        OnNodeComplete, OnNodeError, OnNodeStart, OnRunComplete, OnRunPaused, OnRunResumed,
        OnRunStart, OnScheduleWarning,
    };
    pub use crate::hooks::{HookPoint, HookRegistrationError, HooksAPI, RunEvent};
    pub use crate::registry::{ExecutionContext, ExecutorRegistry, NodeExecutor};
    pub use crate::run::{EngineStatus, ExecutionRun, NodeResult, RunStatus};
    pub use flowline_graph::prelude::*;
}

pub use config::{EngineConfig, FailurePolicy};
pub use data::{InputData, NodeOutput};
pub use error::{EngineError, ExecutorError, NodeError, RunError};
pub use executor::{EngineBuilder, WorkflowEngine};
pub use history::{ExecutionHistory, HistorySnapshot, HistoryStore};
pub use hooks::{HooksAPI, RunEvent};
pub use registry::{ExecutionContext, ExecutorRegistry, NodeExecutor};
pub use run::{EngineStatus, ExecutionRun, NodeResult, RunStatus};
