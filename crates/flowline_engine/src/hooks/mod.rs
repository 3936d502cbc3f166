//! Lifecycle hooks for workflow runs.
//!
//! Hosts observe a run (progress bars, logging, orchestration) by registering
//! observers on hook points. The engine makes no assumption about how many
//! observers listen.
//!
//! - **Points** ([`points`]): marker types identifying when hooks fire
//! - **Events** ([`events`]): the `RunEvent` enum every hook receives
//! - **API** ([`api`]): registration and invocation
//!
//! # Example
//!
//! ```ignore
//! use flowline_engine::hooks::{HooksAPI, RunEvent};
//! use flowline_engine::hooks::points::{OnNodeComplete, OnRunComplete};
//!
//! let hooks = HooksAPI::new();
//! hooks.register_observer::<(OnNodeComplete, OnRunComplete), _>("ui", |event: &RunEvent| {
//!     match event {
//!         RunEvent::NodeComplete { node_id, progress, .. } => update_bar(node_id, *progress),
//!         RunEvent::RunComplete { status, .. } => show_status(*status),
//!         _ => {}
//!     }
//! })?;
//! ```

pub mod api;
pub mod events;
pub mod points;

pub use api::{BoxedHook, HookRegistrationError, HooksAPI};
pub use events::RunEvent;
pub use points::{HookPoint, HookPointId, IntoHookPoints};
