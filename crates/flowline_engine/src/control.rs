//! Cooperative run control.
//!
//! Each run owns a [`RunControl`]: a watch channel carrying the current
//! [`ControlSignal`] plus the cancellation token handed to executors. The run
//! loop calls [`RunControl::checkpoint`] between nodes only; an in-flight
//! executor is never interrupted.
//!
//! Controls are per run, so resetting the engine and starting again never
//! revives a run that was cancelled.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Control requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSignal {
    /// Advance through the schedule.
    Running,
    /// Hold at the next node boundary.
    Paused,
    /// Stop at the next node boundary. Terminal.
    Cancelled,
}

/// Outcome of a node-boundary checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Checkpoint {
    /// Execute the next node.
    Proceed,
    /// Stop; the run was cancelled.
    Abort,
}

/// Signal and cancellation token of one run.
#[derive(Debug, Clone)]
pub(crate) struct RunControl {
    signal: Arc<watch::Sender<ControlSignal>>,
    token: CancellationToken,
}

impl RunControl {
    pub(crate) fn new() -> Self {
        let (signal, _) = watch::channel(ControlSignal::Running);
        Self {
            signal: Arc::new(signal),
            token: CancellationToken::new(),
        }
    }

    /// Returns the current signal.
    pub(crate) fn current(&self) -> ControlSignal {
        *self.signal.borrow()
    }

    /// Returns the token executors observe.
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// `Running -> Paused`. Returns true on transition.
    pub(crate) fn pause(&self) -> bool {
        self.transition(ControlSignal::Running, ControlSignal::Paused)
    }

    /// `Paused -> Running`. Returns true on transition.
    pub(crate) fn resume(&self) -> bool {
        self.transition(ControlSignal::Paused, ControlSignal::Running)
    }

    /// Moves to `Cancelled` and fires the token. Returns true on transition.
    pub(crate) fn cancel(&self) -> bool {
        let changed = self.signal.send_if_modified(|signal| {
            if *signal == ControlSignal::Cancelled {
                false
            } else {
                *signal = ControlSignal::Cancelled;
                true
            }
        });
        self.token.cancel();
        changed
    }

    fn transition(&self, from: ControlSignal, to: ControlSignal) -> bool {
        self.signal.send_if_modified(|signal| {
            if *signal == from {
                *signal = to;
                true
            } else {
                false
            }
        })
    }

    /// Waits out a pause and reports whether the run may continue.
    pub(crate) async fn checkpoint(&self) -> Checkpoint {
        let mut receiver = self.signal.subscribe();
        let signal = receiver
            .wait_for(|signal| *signal != ControlSignal::Paused)
            .await
            .map(|signal| *signal);

        match signal {
            Ok(ControlSignal::Running) => Checkpoint::Proceed,
            Ok(ControlSignal::Paused | ControlSignal::Cancelled) | Err(_) => Checkpoint::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn transitions_are_idempotent() {
        let control = RunControl::new();
        assert!(control.pause());
        assert!(!control.pause());
        assert_eq!(control.current(), ControlSignal::Paused);

        assert!(control.resume());
        assert!(!control.resume());
        assert_eq!(control.current(), ControlSignal::Running);

        assert!(control.cancel());
        assert!(!control.cancel());
        assert!(!control.pause());
        assert!(!control.resume());
        assert_eq!(control.current(), ControlSignal::Cancelled);
        assert!(control.token().is_cancelled());
    }

    #[tokio::test]
    async fn checkpoint_proceeds_when_running() {
        let control = RunControl::new();
        assert_eq!(control.checkpoint().await, Checkpoint::Proceed);
    }

    #[tokio::test]
    async fn checkpoint_waits_for_resume() {
        let control = RunControl::new();
        control.pause();

        let waiter = control.clone();
        let handle = tokio::spawn(async move { waiter.checkpoint().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        control.resume();
        assert_eq!(handle.await.unwrap(), Checkpoint::Proceed);
    }

    #[tokio::test]
    async fn cancel_releases_a_paused_checkpoint() {
        let control = RunControl::new();
        control.pause();

        let waiter = control.clone();
        let handle = tokio::spawn(async move { waiter.checkpoint().await });

        control.cancel();
        assert_eq!(handle.await.unwrap(), Checkpoint::Abort);
    }
}
