//! A workflow execution engine for Rust.
//!
//! Flowline runs host-defined workflows: a graph of typed nodes joined by
//! data connections is validated, scheduled in a deterministic topological
//! order and executed node by node, with pause, resume, cancel and reset
//! honoured at node boundaries.
//!
//! ```ignore
//! use flowline::prelude::*;
//!
//! let engine = WorkflowEngine::new();
//! let run = engine.start("wf-1", &definition, serde_json::json!({})).await?;
//! assert_eq!(run.status, RunStatus::Completed);
//! ```

pub use flowline_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use flowline_internal::prelude::*;
}
