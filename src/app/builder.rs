use std::sync::Arc;

use tokio::sync::mpsc;

use super::app::App;
use super::config::AppConfig;
use super::lifecycle::{AppLifecycle, NoopLifecycle};
use crate::context::Context;
use crate::error::{RuntimeError, Stage};
use crate::subscribers::Subscribe;

/// Builder for constructing an [`App`] with optional features.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use appvisor::{App, AppConfig, Context, RunState};
///
/// let app = App::builder(Context::new())
///     .with_config(AppConfig::default().with_name("world"))
///     .build();
///
/// assert_eq!(app.name(), "world");
/// assert_eq!(app.state(), RunState::Idle);
/// ```
pub struct AppBuilder {
    ctx: Context,
    cfg: AppConfig,
    lifecycle: Arc<dyn AppLifecycle>,
    error_sink: Option<mpsc::UnboundedSender<RuntimeError>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl AppBuilder {
    /// Creates a builder with default configuration and no callbacks.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            cfg: AppConfig::default(),
            lifecycle: Arc::new(NoopLifecycle),
            error_sink: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the lifecycle callbacks.
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn AppLifecycle>) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Sets the channel receiving recovered callback panics.
    ///
    /// Without a sink, recovered panics are logged through `tracing`.
    pub fn with_error_sink(mut self, sink: mpsc::UnboundedSender<RuntimeError>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive the app's events through dedicated workers with
    /// bounded queues, starting when the app is run.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the app and invokes `on_init`.
    ///
    /// With `auto_recover` disabled, a panic in `on_init` propagates to the caller.
    pub fn build(self) -> Arc<App> {
        let app = Arc::new(App::new_internal(
            self.cfg,
            self.ctx,
            self.lifecycle,
            self.error_sink,
            self.subscribers,
        ));
        app.callback(Stage::Init);
        app
    }
}
