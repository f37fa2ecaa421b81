//! # App configuration.
//!
//! Provides [`AppConfig`], the settings consumed by
//! [`AppBuilder`](crate::AppBuilder).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 (see [`AppConfig::bus_capacity_clamped`])

use std::borrow::Cow;

/// Configuration of a single [`App`](crate::App).
///
/// ## Field semantics
/// - `auto_recover`: catch panics raised by lifecycle callbacks
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `name`: label carried by every event the app publishes
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Catch panics raised inside `on_init`, `on_start` and `on_stop`.
    ///
    /// When `true`, a panic is converted to
    /// [`RuntimeError::CallbackPanicked`](crate::RuntimeError::CallbackPanicked),
    /// sent to the error sink and published as an event; the app carries on
    /// with the next lifecycle step. When `false`, the panic propagates.
    pub auto_recover: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging more than `bus_capacity` events observe `Lagged`
    /// and skip older items.
    pub bus_capacity: usize,

    /// Name of the app in events and logs.
    pub name: Cow<'static, str>,
}

impl AppConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Sets the app name.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for AppConfig {
    /// Default configuration:
    ///
    /// - `auto_recover = true`
    /// - `bus_capacity = 1024`
    /// - `name = "app"`
    fn default() -> Self {
        Self {
            auto_recover: true,
            bus_capacity: 1024,
            name: Cow::Borrowed("app"),
        }
    }
}
