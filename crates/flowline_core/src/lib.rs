//! Core infrastructure for Flowline (Layer 1).
//!
//! - [`Clock`] - Mockable time source for durations and timestamps
//! - [`TracingSetup`] - Global `tracing` subscriber configuration

/// Tracing subscriber setup.
pub mod logging;

/// Time sources.
pub mod time;

pub use logging::{TracingFormat, TracingSetup};
#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;
pub use time::{Clock, ClockProvider, duration_ms};
