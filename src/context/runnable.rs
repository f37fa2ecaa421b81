//! # Run-state machine.
//!
//! ```text
//! Idle ──run()──► Running ──cancel observed──► ShuttingDown ──work drained──► Shutdown
//! ```
//!
//! [`Runnable`] stores the state in a [`tokio::sync::watch`] channel so that
//! transitions are atomic check-and-set operations and observers can await a
//! state with [`Runnable::wait_for`].
//!
//! ## Rules
//! - Transitions only move forward; `Shutdown` is terminal.
//! - Only `Idle → Running` may fail; any other starting state is reported as
//!   [`RuntimeError::AlreadyRunning`].

use tokio::sync::watch;

use crate::error::RuntimeError;

/// Lifecycle state of a runnable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunState {
    /// Constructed, `run()` not yet called.
    Idle,
    /// Running; cancellation not yet observed.
    Running,
    /// Cancellation observed; waiting for supervised work to drain.
    ShuttingDown,
    /// Terminal.
    Shutdown,
}

impl RunState {
    /// Returns a short stable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::ShuttingDown => "shutting_down",
            RunState::Shutdown => "shutdown",
        }
    }
}

/// Start/stop state tracking.
#[derive(Debug)]
pub struct Runnable {
    state: watch::Sender<RunState>,
}

impl Runnable {
    /// Creates a runnable in the `Idle` state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// `Idle → Running`.
    pub fn mark_running(&self) -> Result<(), RuntimeError> {
        let mut observed = RunState::Idle;
        let moved = self.state.send_if_modified(|s| {
            observed = *s;
            if *s == RunState::Idle {
                *s = RunState::Running;
                true
            } else {
                false
            }
        });

        if moved {
            Ok(())
        } else {
            Err(RuntimeError::AlreadyRunning { state: observed })
        }
    }

    /// `Running → ShuttingDown`. Returns false if the state did not change.
    pub fn mark_shutting_down(&self) -> bool {
        self.advance(RunState::ShuttingDown)
    }

    /// Any state → `Shutdown`. Returns false if already shut down.
    pub fn mark_shutdown(&self) -> bool {
        self.advance(RunState::Shutdown)
    }

    /// Waits until the state is `target` or later.
    pub async fn wait_for(&self, target: RunState) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|s| *s >= target).await;
    }

    fn advance(&self, to: RunState) -> bool {
        self.state.send_if_modified(|s| {
            if *s < to {
                *s = to;
                true
            } else {
                false
            }
        })
    }
}

impl Default for Runnable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn forward_only_transitions() {
        let r = Runnable::new();
        assert_eq!(r.state(), RunState::Idle);

        r.mark_running().unwrap();
        assert!(r.mark_shutting_down());
        assert!(!r.mark_shutting_down());
        assert!(r.mark_shutdown());
        assert!(!r.mark_shutdown());
        assert_eq!(r.state(), RunState::Shutdown);
    }

    #[test]
    fn double_run_reports_observed_state() {
        let r = Runnable::new();
        r.mark_running().unwrap();
        assert_eq!(
            r.mark_running(),
            Err(RuntimeError::AlreadyRunning { state: RunState::Running })
        );

        r.mark_shutdown();
        assert_eq!(
            r.mark_running(),
            Err(RuntimeError::AlreadyRunning { state: RunState::Shutdown })
        );
    }

    #[tokio::test]
    async fn wait_for_observes_later_states() {
        let r = Arc::new(Runnable::new());
        let waiter = {
            let r = Arc::clone(&r);
            tokio::spawn(async move { r.wait_for(RunState::ShuttingDown).await })
        };

        r.mark_running().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        // jumping straight to Shutdown also satisfies the waiter
        r.mark_shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must finish")
            .unwrap();
    }
}
