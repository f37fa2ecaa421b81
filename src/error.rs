//! Error types used by the appvisor runtime and the binding layer.
//!
//! This module defines two error enums:
//!
//! - [`RuntimeError`]: errors raised by the application runtime itself
//!   (lifecycle misuse, registry contract violations, callback failures).
//! - [`BindError`]: recoverable failures of [`bind_event`](crate::bind_event).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//!
//! ## Contract violations
//! A double [`App::run`](crate::App::run) or a duplicate entity identifier is a
//! bug in the calling code. They are reported as distinguished
//! [`RuntimeError`] variants (see [`RuntimeError::is_contract_violation`])
//! instead of aborting the process; the runtime state is left unchanged.

use thiserror::Error;

use crate::context::RunState;
use crate::uid::Uid;

/// Lifecycle stage a callback was running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// [`AppLifecycle::on_init`](crate::AppLifecycle::on_init), during build.
    Init,
    /// [`AppLifecycle::on_start`](crate::AppLifecycle::on_start), first step of the run loop.
    Start,
    /// [`AppLifecycle::on_stop`](crate::AppLifecycle::on_stop), after supervised work drained.
    Stop,
}

impl Stage {
    /// Returns a short stable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Start => "start",
            Stage::Stop => "stop",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Errors produced by the appvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// `run()` was called on an app that already left the `Idle` state.
    #[error("app already running (state: {state:?})")]
    AlreadyRunning {
        /// State observed when the second `run()` was attempted.
        state: RunState,
    },

    /// An entity with the same identifier is already registered.
    #[error("entity id {id} already exists")]
    DuplicateEntity {
        /// The conflicting identifier.
        id: Uid,
    },

    /// A lifecycle callback panicked and the panic was recovered.
    #[error("{stage} callback panicked: {message}")]
    CallbackPanicked {
        /// Stage the callback was running in.
        stage: Stage,
        /// Panic payload rendered as text.
        message: String,
    },

    /// The run loop terminated because of an unrecovered panic.
    #[error("run loop panicked: {message}")]
    RunLoopPanicked {
        /// Panic payload rendered as text (or the join error).
        message: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use appvisor::{RuntimeError, Uid};
    ///
    /// let err = RuntimeError::DuplicateEntity { id: Uid::MIN };
    /// assert_eq!(err.as_label(), "runtime_duplicate_entity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyRunning { .. } => "runtime_already_running",
            RuntimeError::DuplicateEntity { .. } => "runtime_duplicate_entity",
            RuntimeError::CallbackPanicked { .. } => "runtime_callback_panicked",
            RuntimeError::RunLoopPanicked { .. } => "runtime_run_loop_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::AlreadyRunning { state } => {
                format!("run() called twice; app is {state:?}")
            }
            RuntimeError::DuplicateEntity { id } => format!("duplicate entity id={id}"),
            RuntimeError::CallbackPanicked { stage, message } => {
                format!("stage={stage} panic={message}")
            }
            RuntimeError::RunLoopPanicked { message } => format!("run loop died: {message}"),
        }
    }

    /// Indicates whether the error reports a bug in the calling code.
    ///
    /// # Example
    /// ```
    /// use appvisor::{RunState, RuntimeError};
    ///
    /// let err = RuntimeError::AlreadyRunning { state: RunState::Running };
    /// assert!(err.is_contract_violation());
    /// ```
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            RuntimeError::AlreadyRunning { .. } | RuntimeError::DuplicateEntity { .. }
        )
    }
}

/// # Errors produced while binding a hook to an event source.
///
/// A failed bind never leaves partial state behind: the hook's attachment set
/// and the source's listener collection are both as they were before the call.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The (hook, source) pair is already bound.
    #[error("hook {hook} is already bound to event source {event_source}")]
    AlreadyBound {
        /// Identifier of the hook.
        hook: Uid,
        /// Identifier of the event source.
        event_source: Uid,
    },
}

impl BindError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BindError::AlreadyBound { .. } => "bind_already_bound",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BindError::AlreadyBound { hook, event_source } => {
                format!("pair already bound: hook={hook} source={event_source}")
            }
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let id = Uid::MIN;
        assert_eq!(
            RuntimeError::AlreadyRunning { state: RunState::Shutdown }.as_label(),
            "runtime_already_running"
        );
        assert_eq!(
            RuntimeError::CallbackPanicked { stage: Stage::Start, message: "x".into() }.as_label(),
            "runtime_callback_panicked"
        );
        assert_eq!(
            BindError::AlreadyBound { hook: id, event_source: id }.as_label(),
            "bind_already_bound"
        );
    }

    #[test]
    fn display_callback_panicked() {
        let err = RuntimeError::CallbackPanicked {
            stage: Stage::Stop,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "stop callback panicked: boom");
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn panic_message_handles_common_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*s), "static");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*s), "owned");
        let s: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*s), "unknown panic");
    }
}
