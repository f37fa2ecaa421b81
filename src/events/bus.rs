//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (run loop, entity
//! operations, signal watcher, subscriber workers).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Receivers:
//!   run loop      ──┐
//!   add/remove    ──┼──────► Bus ───┬──► subscriber listener ──► SubscriberSet
//!   signal watcher──┤  (broadcast)  └──► user receivers (Bus::subscribe)
//!   workers       ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn receivers_get_events_sent_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::AppStarting));

        let mut rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        bus.publish(Event::new(EventKind::AppRunning));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::AppRunning);
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(Event::new(EventKind::EntityAdded));
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::AppShutdown));
    }
}
