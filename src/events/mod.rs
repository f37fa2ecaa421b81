//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by an [`App`](crate::App) and
//! by subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the app run loop (lifecycle), entity operations (registry),
//!   the shutdown-signal watcher, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the app's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained through [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
