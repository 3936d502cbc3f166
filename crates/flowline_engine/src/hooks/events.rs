//! Unified event enum for run lifecycle hooks.
//!
//! All hooks receive `&RunEvent` and match on variants for typed access.
//!
//! # Example
//!
//! ```ignore
//! use flowline_engine::hooks::RunEvent;
//!
//! fn handle_event(event: &RunEvent) {
//!     match event {
//!         RunEvent::NodeComplete { node_id, progress, .. } => {
//!             println!("{node_id} done, {progress:.0}%");
//!         }
//!         RunEvent::RunComplete { status, duration_ms, .. } => {
//!             println!("run {status} in {duration_ms}ms");
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use core::time::Duration;

use flowline_graph::{NodeId, NodeStatus, ScheduleWarning};
use indexmap::IndexMap;

use super::points::{
    HookPointId, OnNodeComplete, OnNodeError, OnNodeStart, OnRunComplete, OnRunPaused,
    OnRunResumed, OnRunStart, OnScheduleWarning,
};
use crate::run::{NodeResult, RunStatus};

/// Unified event enum for all run lifecycle hooks.
///
/// Per-node variants carry `{ node_id, status, progress }`, where `progress`
/// is the percentage of scheduled nodes in a terminal state.
#[derive(Debug, Clone)]
pub enum RunEvent {
    // ─────────────────────────────────────────────────────────────────────────
    // Run-Level Events
    // ─────────────────────────────────────────────────────────────────────────
    /// The graph validated and the run is about to execute its first node.
    RunStart {
        /// The run ID.
        run_id: String,
        /// The workflow being executed.
        workflow_id: String,
        /// Number of scheduled nodes.
        node_count: usize,
    },

    /// Scheduling produced a non-fatal finding.
    ScheduleWarning {
        /// The run ID.
        run_id: String,
        /// The finding.
        warning: ScheduleWarning,
    },

    /// The run was paused.
    RunPaused {
        /// The run ID.
        run_id: String,
    },

    /// The run was resumed.
    RunResumed {
        /// The run ID.
        run_id: String,
    },

    /// The run reached a terminal status.
    RunComplete {
        /// The run ID.
        run_id: String,
        /// Terminal status.
        status: RunStatus,
        /// Monotonic duration of the run.
        duration_ms: u64,
        /// Per-node outcomes, in schedule order.
        node_results: IndexMap<NodeId, NodeResult>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Node Events
    // ─────────────────────────────────────────────────────────────────────────
    /// A node turned `running`.
    NodeStart {
        /// The node.
        node_id: NodeId,
        /// Always [`NodeStatus::Running`].
        status: NodeStatus,
        /// Progress before this node.
        progress: f64,
    },

    /// A node turned `completed`.
    NodeComplete {
        /// The node.
        node_id: NodeId,
        /// Always [`NodeStatus::Completed`].
        status: NodeStatus,
        /// Progress including this node.
        progress: f64,
        /// Time spent in the executor.
        duration: Duration,
    },

    /// A node turned `error`.
    NodeError {
        /// The node.
        node_id: NodeId,
        /// Always [`NodeStatus::Error`].
        status: NodeStatus,
        /// Progress including this node.
        progress: f64,
        /// The error message.
        error: String,
    },
}

impl RunEvent {
    /// Returns the hook point this event is dispatched to.
    #[must_use]
    pub fn hook_point(&self) -> HookPointId {
        match self {
            RunEvent::RunStart { .. } => HookPointId::of::<OnRunStart>(),
            RunEvent::ScheduleWarning { .. } => HookPointId::of::<OnScheduleWarning>(),
            RunEvent::RunPaused { .. } => HookPointId::of::<OnRunPaused>(),
            RunEvent::RunResumed { .. } => HookPointId::of::<OnRunResumed>(),
            RunEvent::RunComplete { .. } => HookPointId::of::<OnRunComplete>(),
            RunEvent::NodeStart { .. } => HookPointId::of::<OnNodeStart>(),
            RunEvent::NodeComplete { .. } => HookPointId::of::<OnNodeComplete>(),
            RunEvent::NodeError { .. } => HookPointId::of::<OnNodeError>(),
        }
    }

    /// Returns the name of the hook point, e.g. `"OnNodeStart"`.
    #[must_use]
    pub fn point_name(&self) -> &'static str {
        self.hook_point().name()
    }

    /// Returns the node ID for node-level events.
    #[must_use]
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            RunEvent::NodeStart { node_id, .. }
            | RunEvent::NodeComplete { node_id, .. }
            | RunEvent::NodeError { node_id, .. } => Some(node_id),
            RunEvent::RunStart { .. }
            | RunEvent::ScheduleWarning { .. }
            | RunEvent::RunPaused { .. }
            | RunEvent::RunResumed { .. }
            | RunEvent::RunComplete { .. } => None,
        }
    }

    /// Returns the progress percentage for node-level events.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        match self {
            RunEvent::NodeStart { progress, .. }
            | RunEvent::NodeComplete { progress, .. }
            | RunEvent::NodeError { progress, .. } => Some(*progress),
            _ => None,
        }
    }
}
