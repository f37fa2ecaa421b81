//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and (feature `logging`) the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   App ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                  │
//!                                                      ┌───────────┼──────────┐
//!                                                      ▼           ▼          ▼
//!                                                  LogWriter    Metrics    Custom
//! ```
//!
//! Subscribers passed to [`AppBuilder::with_subscribers`](crate::AppBuilder::with_subscribers)
//! start receiving events once [`App::run`](crate::App::run) is called.

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
