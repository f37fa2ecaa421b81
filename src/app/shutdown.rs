//! # OS signal driven shutdown.
//!
//! [`App::stop_on_shutdown_signal`] stops an app when the process receives a
//! termination signal.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::app::App;
use crate::events::{Event, EventKind};

impl App {
    /// Spawns a watcher that calls [`stop`](App::stop) on the first
    /// termination signal and publishes `ShutdownRequested`.
    ///
    /// The watcher exits without action once the app is stopped by other
    /// means. It holds no strong reference to the app.
    pub fn stop_on_shutdown_signal(self: &Arc<Self>) -> JoinHandle<()> {
        let app = Arc::downgrade(self);
        let ctx = self.context().clone();
        tokio::spawn(async move {
            tokio::select! {
                res = wait_for_shutdown_signal() => {
                    if let Err(err) = res {
                        tracing::warn!(error = %err, "signal registration failed");
                        return;
                    }
                    if let Some(app) = app.upgrade() {
                        app.publish(Event::new(EventKind::ShutdownRequested).with_reason("signal"));
                    }
                    ctx.cancel();
                }
                _ = ctx.done() => {}
            }
        })
    }
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
