//! # Runtime events emitted by an [`App`](crate::App).
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: run-loop transitions (starting, running, shutting down, shutdown)
//! - **Registry events**: entities added to or removed from the app registry
//! - **Failure events**: recovered callback panics, subscriber panics and overflows
//!
//! The [`Event`] struct carries additional metadata such as timestamps, app
//! name, subscriber name, entity id, lifecycle stage and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use appvisor::{Event, EventKind, Stage, Uid};
//!
//! let ev = Event::new(EventKind::CallbackPanicked)
//!     .with_app("game")
//!     .with_stage(Stage::Start)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::CallbackPanicked);
//! assert_eq!(ev.app.as_deref(), Some("game"));
//! assert_eq!(ev.stage, Some(Stage::Start));
//!
//! let added = Event::new(EventKind::EntityAdded).with_entity(Uid::MIN);
//! assert!(added.seq > ev.seq);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::Stage;
use crate::uid::Uid;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `app`: emitting app, when the set belongs to one
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `app`: emitting app, when the set belongs to one
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Lifecycle events ===
    /// Run loop spawned; `on_start` is about to be invoked.
    ///
    /// Sets: `app`
    AppStarting,

    /// `on_start` returned; the app waits for cancellation.
    ///
    /// Sets: `app`
    AppRunning,

    /// Shutdown requested (OS signal observed).
    ///
    /// Sets: `app`, `reason` (signal description)
    ShutdownRequested,

    /// Cancellation observed; supervised work is draining.
    ///
    /// Sets: `app`
    AppShuttingDown,

    /// Terminal state reached; `on_stop` has run.
    ///
    /// Sets: `app`
    AppShutdown,

    // === Registry events ===
    /// Entity registered.
    ///
    /// Sets: `app`, `entity`
    EntityAdded,

    /// Entity removed from the registry.
    ///
    /// Sets: `app`, `entity`
    EntityRemoved,

    // === Failures ===
    /// Lifecycle callback panicked and was recovered.
    ///
    /// Sets: `app`, `stage`, `reason` (panic message)
    CallbackPanicked,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
            EventKind::AppStarting => "app_starting",
            EventKind::AppRunning => "app_running",
            EventKind::ShutdownRequested => "shutdown_requested",
            EventKind::AppShuttingDown => "app_shutting_down",
            EventKind::AppShutdown => "app_shutdown",
            EventKind::EntityAdded => "entity_added",
            EventKind::EntityRemoved => "entity_removed",
            EventKind::CallbackPanicked => "callback_panicked",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the emitting app.
    pub app: Option<Arc<str>>,
    /// Subscriber concerned by a subscriber event.
    pub subscriber: Option<&'static str>,
    /// Entity concerned by a registry event.
    pub entity: Option<Uid>,
    /// Lifecycle stage of a callback event.
    pub stage: Option<Stage>,
    /// Human-readable reason (panic messages, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            app: None,
            subscriber: None,
            entity: None,
            stage: None,
            reason: None,
        }
    }

    /// Attaches the emitting app's name.
    #[inline]
    pub fn with_app(mut self, app: impl Into<Arc<str>>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: &'static str) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    /// Attaches an entity identifier.
    #[inline]
    pub fn with_entity(mut self, id: Uid) -> Self {
        self.entity = Some(id);
        self
    }

    /// Attaches a lifecycle stage.
    #[inline]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_strictly_increasing() {
        let a = Event::new(EventKind::AppStarting);
        let b = Event::new(EventKind::AppRunning);
        let c = Event::new(EventKind::AppShutdown);
        assert!(a.seq < b.seq && b.seq < c.seq);
    }

    #[test]
    fn subscriber_helpers_set_name_and_reason() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
        // the app slot stays free for the emitting app
        assert!(ev.app.is_none());

        let ev = Event::subscriber_panicked("audit", "oops".into()).with_app("game");
        assert!(ev.is_subscriber_panic());
        assert!(!ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("audit"));
        assert_eq!(ev.app.as_deref(), Some("game"));
    }

    #[test]
    fn labels() {
        assert_eq!(EventKind::EntityRemoved.as_str(), "entity_removed");
        assert_eq!(EventKind::AppShuttingDown.as_str(), "app_shutting_down");
    }
}
