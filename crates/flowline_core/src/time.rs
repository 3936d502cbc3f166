//! Time sources.
//!
//! The engine measures run and node durations with a monotonic [`Instant`]
//! and stamps run records with a wall-clock [`SystemTime`]. Both come from a
//! [`Clock`], which wraps a swappable [`ClockProvider`] so tests can freeze
//! and advance time.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use flowline_core::{Clock, MockClock};
//!
//! let mock = Arc::new(MockClock::default());
//! let clock = Clock::with_provider(mock.clone());
//!
//! let start = clock.now();
//! mock.advance(Duration::from_millis(250));
//! assert_eq!(clock.elapsed_since(start), Duration::from_millis(250));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for providing current time.
///
/// Implement this for custom time providers (e.g., a frozen clock in tests).
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time.
    fn wall(&self) -> SystemTime;
}

/// System clock provider using `std::time`.
#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> SystemTime {
        SystemTime::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Time provider shared by the engine and its history.
///
/// Uses the system clock by default. Cloning is cheap; clones share the
/// provider.
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl Clock {
    /// Creates a Clock using the system clock.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a Clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn wall(&self) -> SystemTime {
        self.provider.wall()
    }

    /// Returns the duration elapsed since the given instant.
    ///
    /// Saturates to zero if `earlier` is in the future.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock for testing with controllable time.
///
/// Advancing the mock moves the monotonic and wall-clock readings together.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockClock {
    current: parking_lot::RwLock<(Instant, SystemTime)>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given readings.
    #[must_use]
    pub fn new(start: Instant, wall: SystemTime) -> Self {
        Self {
            current: parking_lot::RwLock::new((start, wall)),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.write();
        current.0 += duration;
        current.1 += duration;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        self.current.read().0
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::now(), SystemTime::UNIX_EPOCH)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }

    fn wall(&self) -> SystemTime {
        self.current.read().1
    }
}
