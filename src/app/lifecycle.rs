//! # Lifecycle callbacks.
//!
//! [`AppLifecycle`] is the strategy object an [`App`](crate::App) calls at its
//! three lifecycle points. All methods default to no-ops; implement the ones
//! you need.
//!
//! ```text
//! build()  ──► on_init
//! run()    ──► on_start ──► (wait for cancel) ──► (drain work) ──► on_stop
//! ```
//!
//! Callbacks are synchronous. Long-running work belongs in tasks spawned on the
//! app context's wait-group from `on_start`; shutdown then waits for them.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::app::App;
use crate::error::{RuntimeError, Stage, panic_message};

/// Lifecycle callbacks of an [`App`].
///
/// # Example
/// ```
/// use appvisor::{App, AppLifecycle};
///
/// struct Greeter;
///
/// impl AppLifecycle for Greeter {
///     fn on_start(&self, app: &App) {
///         println!("{} started", app.name());
///     }
/// }
/// ```
pub trait AppLifecycle: Send + Sync + 'static {
    /// Called once from [`AppBuilder::build`](crate::AppBuilder::build).
    fn on_init(&self, _app: &App) {}

    /// Called by the run loop before it waits for cancellation.
    fn on_start(&self, _app: &App) {}

    /// Called after cancellation, once supervised work has drained.
    fn on_stop(&self, _app: &App) {}
}

/// Lifecycle that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycle;

impl AppLifecycle for NoopLifecycle {}

fn invoke(lifecycle: &dyn AppLifecycle, app: &App, stage: Stage) {
    match stage {
        Stage::Init => lifecycle.on_init(app),
        Stage::Start => lifecycle.on_start(app),
        Stage::Stop => lifecycle.on_stop(app),
    }
}

/// Runs one callback, catching its panic when `recover` is set.
///
/// Returns the recovered panic as [`RuntimeError::CallbackPanicked`]. Without
/// recovery a panic unwinds through the caller.
pub(crate) fn run_callback(
    lifecycle: &dyn AppLifecycle,
    app: &App,
    stage: Stage,
    recover: bool,
) -> Result<(), RuntimeError> {
    if !recover {
        invoke(lifecycle, app, stage);
        return Ok(());
    }

    catch_unwind(AssertUnwindSafe(|| invoke(lifecycle, app, stage))).map_err(|payload| {
        RuntimeError::CallbackPanicked {
            stage,
            message: panic_message(&*payload),
        }
    })
}
