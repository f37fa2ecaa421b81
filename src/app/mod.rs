//! # App runtime.
//!
//! - [`App`]: lifecycle-managed container of entities with its run loop;
//! - [`AppBuilder`]: wires configuration, callbacks, error sink and subscribers;
//! - [`AppConfig`]: settings;
//! - [`AppLifecycle`]: `on_init` / `on_start` / `on_stop` callbacks;
//! - [`RunHandle`]: completion of a run loop.
//!
//! ```text
//!   AppBuilder::build() ──► Arc<App> ──► on_init
//!          │
//!          ▼
//!   App::run() ──► RunHandle ──► wait() ─► Ok | Err(RunLoopPanicked)
//!          │
//!   App::stop() / parent cancel / OS signal ──► cancellation ──► shutdown
//! ```

#[allow(clippy::module_inception)]
mod app;
mod builder;
mod config;
mod lifecycle;
mod shutdown;

pub use app::{App, RunHandle};
pub use builder::AppBuilder;
pub use config::AppConfig;
pub use lifecycle::{AppLifecycle, NoopLifecycle};
pub use shutdown::wait_for_shutdown_signal;
