//! # LogWriter: events as `tracing` records
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Lifecycle and registry events are emitted at `info`/`debug`, failures at
//! `warn`/`error`. Install any `tracing` subscriber to see them.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//!  INFO appvisor: app starting app="game" seq=0
//! DEBUG appvisor: entity added app="game" entity=1 seq=2
//!  INFO appvisor: app shutting down app="game" seq=4
//! ERROR appvisor: callback panicked app="game" stage=stop reason="boom" seq=5
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let app = e.app.as_deref().unwrap_or("-");
        let subscriber = e.subscriber.unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let seq = e.seq;
        match e.kind {
            EventKind::AppStarting => tracing::info!(target: "appvisor", app, seq, "app starting"),
            EventKind::AppRunning => tracing::info!(target: "appvisor", app, seq, "app running"),
            EventKind::ShutdownRequested => {
                tracing::info!(target: "appvisor", app, reason, seq, "shutdown requested")
            }
            EventKind::AppShuttingDown => {
                tracing::info!(target: "appvisor", app, seq, "app shutting down")
            }
            EventKind::AppShutdown => tracing::info!(target: "appvisor", app, seq, "app shutdown"),
            EventKind::EntityAdded => {
                tracing::debug!(target: "appvisor", app, entity = ?e.entity, seq, "entity added")
            }
            EventKind::EntityRemoved => {
                tracing::debug!(target: "appvisor", app, entity = ?e.entity, seq, "entity removed")
            }
            EventKind::CallbackPanicked => tracing::error!(
                target: "appvisor",
                app,
                stage = e.stage.map(|s| s.as_str()).unwrap_or("-"),
                reason,
                seq,
                "callback panicked"
            ),
            EventKind::SubscriberPanicked => {
                tracing::warn!(target: "appvisor", app, subscriber, reason, seq, "subscriber panicked")
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "appvisor", app, subscriber, reason, seq, "subscriber overflow")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    #[tokio::test]
    async fn handles_every_kind_without_a_subscriber_installed() {
        let w = LogWriter::new();
        for kind in [
            EventKind::AppStarting,
            EventKind::AppRunning,
            EventKind::ShutdownRequested,
            EventKind::AppShuttingDown,
            EventKind::AppShutdown,
            EventKind::EntityAdded,
            EventKind::EntityRemoved,
            EventKind::CallbackPanicked,
            EventKind::SubscriberPanicked,
            EventKind::SubscriberOverflow,
        ] {
            w.on_event(
                &Event::new(kind)
                    .with_app("t")
                    .with_subscriber("s")
                    .with_stage(Stage::Init),
            )
            .await;
        }
        assert_eq!(w.name(), "LogWriter");
    }
}
