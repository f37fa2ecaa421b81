//! # Non-blocking event fan-out to multiple subscribers.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: a panicking subscriber is reported and keeps receiving events
//! - **Attribution**: failure events name the subscriber in `subscriber` and,
//!   for a set built with [`SubscriberSet::for_app`], the app in `app`
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber panics while holding a lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
///
/// Each subscriber gets a dedicated bounded queue and worker task. Panics are
/// caught and reported on the bus; dropped events are reported via
/// `SubscriberOverflow`.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
    app: Option<Arc<str>>,
}

fn attributed(ev: Event, app: &Option<Arc<str>>) -> Event {
    match app {
        Some(app) => ev.with_app(Arc::clone(app)),
        None => ev,
    }
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a tokio runtime. Queue capacity is taken from
    /// [`Subscribe::queue_capacity`], minimum 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        Self::spawn(subs, bus, None)
    }

    /// Like [`SubscriberSet::new`], stamping `app` on the failure events it publishes.
    #[must_use]
    pub fn for_app(app: impl Into<Arc<str>>, subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        Self::spawn(subs, bus, Some(app.into()))
    }

    fn spawn(subs: Vec<Arc<dyn Subscribe>>, bus: Bus, app: Option<Arc<str>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let worker_bus = bus.clone();
            let worker_app = app.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = panic_message(&*panic_err);
                        tracing::warn!(subscriber = name, panic = %info, "subscriber panicked");
                        worker_bus.publish(attributed(
                            Event::subscriber_panicked(name, info),
                            &worker_app,
                        ));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            bus,
            app,
        }
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true if the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an event to all subscribers (clones the event once).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// `SubscriberOverflow` events are not re-published if they themselves
    /// overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus.publish(attributed(
                    Event::subscriber_overflow(channel.name, reason),
                    &self.app,
                ));
            }
        }
    }

    /// Closes all queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, ev: &Event) {
            if ev.kind == EventKind::AppStarting {
                panic!("exploder");
            }
        }
        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    struct Sleepy;

    #[async_trait]
    impl Subscribe for Sleepy {
        async fn on_event(&self, _ev: &Event) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        fn name(&self) -> &'static str {
            "sleepy"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn fan_out_preserves_per_subscriber_order() {
        let bus = Bus::new(16);
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![a.clone(), b.clone()], bus);
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::AppStarting));
        set.emit(&Event::new(EventKind::AppRunning));
        set.shutdown().await;

        let expected = [EventKind::AppStarting, EventKind::AppRunning];
        assert_eq!(*a.kinds.lock(), expected);
        assert_eq!(*b.kinds.lock(), expected);
    }

    #[tokio::test]
    async fn panic_is_isolated_and_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::for_app("world", vec![Arc::new(Exploder), rec.clone()], bus);

        set.emit(&Event::new(EventKind::AppStarting));
        set.emit(&Event::new(EventKind::AppShutdown));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert!(ev.is_subscriber_panic());
        assert_eq!(ev.subscriber, Some("exploder"));
        assert_eq!(ev.app.as_deref(), Some("world"));
        assert_eq!(ev.reason.as_deref(), Some("exploder"));
        assert_eq!(rec.kinds.lock().len(), 2);
    }

    #[tokio::test]
    async fn full_queue_reports_overflow() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Sleepy)], bus);

        // worker takes at most one, queue holds one more; the rest overflow
        for _ in 0..4 {
            set.emit(&Event::new(EventKind::EntityAdded));
        }

        let ev = rx.recv().await.unwrap();
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("sleepy"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
        assert!(ev.app.is_none());
    }
}
