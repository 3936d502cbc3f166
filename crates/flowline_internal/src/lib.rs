//! # Flowline Internal Library
//!
//! Re-exports the core Flowline crates for convenience.

/// Layer 1: Clock and tracing setup.
pub use flowline_core;

/// Layer 2: Graph model, scheduling and conditions.
pub use flowline_graph;

/// Layer 3: Executors, run control, hooks and history.
pub use flowline_engine;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use flowline_core::{Clock, TracingFormat, TracingSetup};
    pub use flowline_engine::prelude::*;
}
