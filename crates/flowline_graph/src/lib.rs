//! Workflow graph primitives for Flowline (Layer 2).
//!
//! `flowline_graph` holds everything about a workflow that can be decided
//! without running it: the node/connection model, structural validation,
//! the deterministic execution order, and the rules that route data through
//! condition nodes.
//!
//! # Core Concepts
//!
//! - [`Graph`] - Indexed, read-only snapshot of a workflow
//! - [`Node`] / [`Connection`] - Vertices and directed data edges
//! - [`Schedule`] - Topological execution order plus non-fatal warnings
//! - [`ConditionSet`] - Flat AND/OR rule set with per-row or batch routing
//!
//! # Example
//!
//! ```ignore
//! use flowline_graph::{Connection, Graph, Node};
//!
//! let graph = Graph::new(
//!     vec![Node::new("a", "trigger"), Node::new("b", "condition")],
//!     vec![Connection::new("ab", "a", "b")],
//! );
//!
//! let schedule = graph.schedule()?;
//! assert_eq!(schedule.order()[0].as_str(), "a");
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`flowline_core`): clock and logging setup
//! - **Layer 2** (`flowline_graph`): graph model, scheduling, conditions (this crate)
//! - **Layer 3** (`flowline_engine`): executors, run control, hooks, history

/// Condition rules and branch routing.
pub mod condition;

/// Connection (edge) types.
pub mod connection;

/// Graph structure and validation.
pub mod graph;

/// Node types and per-node status.
pub mod node;

/// Topological scheduling.
pub mod scheduler;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::condition::{
        ConditionError, ConditionRule, ConditionSet, FALSE_BRANCH, LogicalOperator, Operator,
        ProcessingMode, Routing, TRUE_BRANCH,
    };
    pub use crate::connection::{Connection, ConnectionId, DEFAULT_PORT};
    pub use crate::graph::{Graph, GraphError, WorkflowDefinition};
    pub use crate::node::{Node, NodeId, NodeStatus};
    pub use crate::scheduler::{Schedule, ScheduleWarning};
}

pub use condition::{ConditionSet, ProcessingMode};
pub use connection::{Connection, ConnectionId};
pub use graph::{Graph, GraphError, WorkflowDefinition};
pub use node::{Node, NodeId, NodeStatus};
pub use scheduler::{Schedule, ScheduleWarning};
