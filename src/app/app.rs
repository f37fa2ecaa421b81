//! # App: lifecycle-managed container of entities.
//!
//! An [`App`] owns a [`Context`], a [`Runnable`] state, an
//! [`EntityRegistry`], a [`UidMaker`] and an event [`Bus`]. Its run loop
//! drives the lifecycle callbacks and gates shutdown on supervised work.
//!
//! ## Run loop
//! ```text
//! run()  Idle ─► Running            (second call: Err(AlreadyRunning))
//!   ├─ parent.wait_group().add()    held until this app reaches Shutdown
//!   └─ spawn ─► on_start
//!               ctx.done().await
//!               ShuttingDown
//!               ctx.wait_group().wait().await
//!               on_stop
//!               Shutdown ─► release parent unit ─► RunHandle completes
//! ```
//!
//! ## Events
//! `AppStarting`, `AppRunning`, `AppShuttingDown`, `AppShutdown` from the run
//! loop; `EntityAdded` / `EntityRemoved` from the registry operations;
//! `CallbackPanicked` for every recovered callback panic.
//!
//! ## Rules
//! - `stop()` is idempotent and never blocks.
//! - Shutdown of an app waits for every unit on its context's wait-group,
//!   including the ones held by child apps.
//! - The app reaches `Shutdown` even if its run loop dies from a panic.
//!   `AppShutdown` is still published and subscribers are drained before the
//!   panic resumes into the [`RunHandle`].

use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;

use super::builder::AppBuilder;
use super::config::AppConfig;
use super::lifecycle::{AppLifecycle, run_callback};
use crate::context::{Context, RunState, Runnable};
use crate::entities::{Entity, EntityRegistry};
use crate::error::{RuntimeError, Stage, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::uid::{Uid, UidMaker};

/// Lifecycle-managed container of entities.
pub struct App {
    cfg: AppConfig,
    name: Arc<str>,
    ctx: Context,
    runnable: Runnable,
    registry: EntityRegistry,
    uids: UidMaker,
    bus: Bus,
    lifecycle: Arc<dyn AppLifecycle>,
    error_sink: Option<mpsc::UnboundedSender<RuntimeError>>,
    subscribers: Mutex<Vec<Arc<dyn Subscribe>>>,
}

/// Completion handle returned by [`App::run`].
#[must_use = "dropping the handle detaches the run loop"]
#[derive(Debug)]
pub struct RunHandle {
    join: JoinHandle<()>,
}

impl RunHandle {
    /// Waits for the app to reach `Shutdown`.
    ///
    /// Returns [`RuntimeError::RunLoopPanicked`] if a lifecycle callback
    /// panicked with `auto_recover` disabled.
    pub async fn wait(self) -> Result<(), RuntimeError> {
        match self.join.await {
            Ok(()) => Ok(()),
            Err(err) if err.is_panic() => Err(RuntimeError::RunLoopPanicked {
                message: panic_message(&*err.into_panic()),
            }),
            Err(err) => Err(RuntimeError::RunLoopPanicked {
                message: err.to_string(),
            }),
        }
    }

    /// Returns true once the run loop has finished.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Marks the app `Shutdown` when the run loop ends, panicking or not.
struct ShutdownGuard<'a>(&'a Runnable);

impl Drop for ShutdownGuard<'_> {
    fn drop(&mut self) {
        self.0.mark_shutdown();
    }
}

impl App {
    /// Starts building an app bound to `ctx`.
    ///
    /// Use [`Context::child_of`] or [`Context::supervised_by`] to nest the app
    /// under another one.
    pub fn builder(ctx: Context) -> AppBuilder {
        AppBuilder::new(ctx)
    }

    pub(crate) fn new_internal(
        cfg: AppConfig,
        ctx: Context,
        lifecycle: Arc<dyn AppLifecycle>,
        error_sink: Option<mpsc::UnboundedSender<RuntimeError>>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let name: Arc<str> = Arc::from(cfg.name.as_ref());
        Self {
            bus: Bus::new(cfg.bus_capacity_clamped()),
            name,
            cfg,
            ctx,
            runnable: Runnable::new(),
            registry: EntityRegistry::new(),
            uids: UidMaker::new(),
            lifecycle,
            error_sink,
            subscribers: Mutex::new(subscribers),
        }
    }

    /// Starts the run loop.
    ///
    /// Fails with [`RuntimeError::AlreadyRunning`] if the app is not `Idle`.
    /// Must be called inside a tokio runtime.
    pub fn run(self: &Arc<Self>) -> Result<RunHandle, RuntimeError> {
        self.runnable.mark_running()?;

        let parent_unit = self.ctx.parent().map(|p| p.wait_group().add());
        let listener = self.subscriber_listener();

        let app = Arc::clone(self);
        let join = tokio::spawn(async move {
            let _parent_unit = parent_unit;
            let outcome = {
                let _shutdown = ShutdownGuard(&app.runnable);
                AssertUnwindSafe(app.supervise()).catch_unwind().await
            };
            app.publish(Event::new(EventKind::AppShutdown));
            if let Some(listener) = listener {
                let _ = listener.await;
            }
            if let Err(payload) = outcome {
                std::panic::resume_unwind(payload);
            }
        });

        Ok(RunHandle { join })
    }

    async fn supervise(&self) {
        self.publish(Event::new(EventKind::AppStarting));
        self.callback(Stage::Start);
        self.publish(Event::new(EventKind::AppRunning));

        self.ctx.done().await;
        self.runnable.mark_shutting_down();
        self.publish(Event::new(EventKind::AppShuttingDown));

        self.ctx.wait_group().wait().await;
        self.callback(Stage::Stop);
    }

    /// Forwards bus events to the configured subscribers until `AppShutdown`.
    fn subscriber_listener(&self) -> Option<JoinHandle<()>> {
        let subs = std::mem::take(&mut *self.subscribers.lock());
        if subs.is_empty() {
            return None;
        }

        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::for_app(Arc::clone(&self.name), subs, self.bus.clone());
        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let last = ev.kind == EventKind::AppShutdown;
                        set.emit(&ev);
                        if last {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }

    /// Raises the cancellation signal. Idempotent and non-blocking.
    pub fn stop(&self) {
        self.ctx.cancel();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.runnable.state()
    }

    /// Waits until the app reaches `state` or a later one.
    pub async fn wait_for(&self, state: RunState) {
        self.runnable.wait_for(state).await;
    }

    /// The app's context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Name from [`AppConfig::name`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the app was built with.
    pub fn config(&self) -> &AppConfig {
        &self.cfg
    }

    /// Event bus of this app.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the next identifier from this app's generator (1, 2, 3, ...).
    pub fn make_uid(&self) -> Uid {
        self.uids.next()
    }

    /// Registers an entity.
    ///
    /// Fails with [`RuntimeError::DuplicateEntity`] if the id is taken; the
    /// registry is unchanged in that case.
    pub fn add_entity(&self, entity: Arc<dyn Entity>) -> Result<(), RuntimeError> {
        let id = entity.entity_id();
        self.registry.add(entity)?;
        self.publish(Event::new(EventKind::EntityAdded).with_entity(id));
        Ok(())
    }

    /// Looks up an entity.
    pub fn get_entity(&self, id: Uid) -> Option<Arc<dyn Entity>> {
        self.registry.get(id)
    }

    /// Removes an entity, returning it if it was registered.
    pub fn remove_entity(&self, id: Uid) -> Option<Arc<dyn Entity>> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            self.publish(Event::new(EventKind::EntityRemoved).with_entity(id));
        }
        removed
    }

    /// Visits a snapshot of the registered entities until the visitor breaks.
    pub fn range_entities<F>(&self, visitor: F)
    where
        F: FnMut(&Arc<dyn Entity>) -> ControlFlow<()>,
    {
        self.registry.range(visitor);
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if `id` is registered.
    pub fn contains_entity(&self, id: Uid) -> bool {
        self.registry.contains(id)
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_app(Arc::clone(&self.name)));
    }

    /// Invokes one lifecycle callback and reports a recovered panic.
    pub(crate) fn callback(&self, stage: Stage) {
        let Err(err) = run_callback(&*self.lifecycle, self, stage, self.cfg.auto_recover) else {
            return;
        };

        if let RuntimeError::CallbackPanicked { stage, message } = &err {
            self.publish(
                Event::new(EventKind::CallbackPanicked)
                    .with_stage(*stage)
                    .with_reason(message.as_str()),
            );
        }

        match &self.error_sink {
            Some(sink) => {
                if let Err(unsent) = sink.send(err) {
                    tracing::error!(app = %self.name, error = %unsent.0, "error sink closed");
                }
            }
            None => {
                tracing::error!(app = %self.name, label = err.as_label(), error = %err, "recovered callback panic");
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("entities", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppLifecycle;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct Thing {
        id: Uid,
    }

    impl Entity for Thing {
        fn entity_id(&self) -> Uid {
            self.id
        }
    }

    #[derive(Default)]
    struct Calls {
        init: AtomicUsize,
        start: AtomicUsize,
        stop: AtomicUsize,
        stop_state: Mutex<Option<RunState>>,
    }

    impl AppLifecycle for Calls {
        fn on_init(&self, _app: &App) {
            self.init.fetch_add(1, Ordering::SeqCst);
        }
        fn on_start(&self, _app: &App) {
            self.start.fetch_add(1, Ordering::SeqCst);
        }
        fn on_stop(&self, app: &App) {
            self.stop.fetch_add(1, Ordering::SeqCst);
            *self.stop_state.lock() = Some(app.state());
        }
    }

    struct PanicOn(Stage);

    impl AppLifecycle for PanicOn {
        fn on_start(&self, _app: &App) {
            if self.0 == Stage::Start {
                panic!("start failed");
            }
        }
        fn on_stop(&self, _app: &App) {
            if self.0 == Stage::Stop {
                panic!("stop failed");
            }
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(2)
    }

    async fn next_kind(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
        loop {
            let ev = tokio::time::timeout(timeout(), rx.recv())
                .await
                .expect("event in time")
                .expect("bus open");
            if ev.kind == kind {
                return ev;
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────

    #[tokio::test]
    async fn runs_callbacks_in_order_and_reaches_shutdown() {
        let calls = Arc::new(Calls::default());
        let app = App::builder(Context::new())
            .with_lifecycle(calls.clone())
            .build();
        assert_eq!(calls.init.load(Ordering::SeqCst), 1);
        assert_eq!(app.state(), RunState::Idle);

        let handle = app.run().unwrap();
        app.wait_for(RunState::Running).await;
        app.stop();
        handle.wait().await.unwrap();

        assert_eq!(app.state(), RunState::Shutdown);
        assert_eq!(calls.start.load(Ordering::SeqCst), 1);
        assert_eq!(calls.stop.load(Ordering::SeqCst), 1);
        assert_eq!(*calls.stop_state.lock(), Some(RunState::ShuttingDown));
    }

    #[tokio::test]
    async fn second_run_is_rejected() {
        let app = App::builder(Context::new()).build();
        let handle = app.run().unwrap();

        let err = app.run().unwrap_err();
        assert_eq!(
            err,
            RuntimeError::AlreadyRunning {
                state: RunState::Running
            }
        );
        assert!(err.is_contract_violation());

        app.stop();
        handle.wait().await.unwrap();
        assert!(matches!(
            app.run(),
            Err(RuntimeError::AlreadyRunning {
                state: RunState::Shutdown
            })
        ));
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_works_before_run() {
        let app = App::builder(Context::new()).build();
        app.stop();
        app.stop();

        let handle = app.run().unwrap();
        tokio::time::timeout(timeout(), handle.wait())
            .await
            .expect("pre-canceled app shuts down at once")
            .unwrap();
        app.stop();
        assert_eq!(app.state(), RunState::Shutdown);
    }

    #[tokio::test]
    async fn shutdown_waits_for_work_units() {
        let app = App::builder(Context::new()).build();
        let unit = app.context().wait_group().add();

        let handle = app.run().unwrap();
        app.stop();
        app.wait_for(RunState::ShuttingDown).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(app.state(), RunState::ShuttingDown);
        assert!(!handle.is_finished());

        drop(unit);
        tokio::time::timeout(timeout(), handle.wait())
            .await
            .expect("drained")
            .unwrap();
        assert_eq!(app.state(), RunState::Shutdown);
    }

    #[tokio::test]
    async fn shutdown_waits_for_spawned_work() {
        let app = App::builder(Context::new()).build();
        let ctx = app.context().clone();
        let finished = Arc::new(AtomicUsize::new(0));

        let f = finished.clone();
        app.context().wait_group().spawn(async move {
            ctx.done().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            f.fetch_add(1, Ordering::SeqCst);
        });

        let handle = app.run().unwrap();
        app.stop();
        handle.wait().await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    // ── Nesting ──────────────────────────────────────────────

    #[tokio::test]
    async fn parent_shutdown_is_gated_on_supervised_child() {
        let parent = App::builder(Context::new()).build();
        let child = App::builder(Context::supervised_by(parent.context())).build();

        let parent_handle = parent.run().unwrap();
        let child_handle = child.run().unwrap();

        parent.stop();
        parent.wait_for(RunState::ShuttingDown).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(parent.state(), RunState::ShuttingDown);
        assert_eq!(child.state(), RunState::Running);

        child.stop();
        child_handle.wait().await.unwrap();
        tokio::time::timeout(timeout(), parent_handle.wait())
            .await
            .expect("parent follows child")
            .unwrap();
        assert_eq!(parent.state(), RunState::Shutdown);
    }

    #[tokio::test]
    async fn child_of_inherits_cancellation() {
        let parent = App::builder(Context::new()).build();
        let child = App::builder(Context::child_of(parent.context())).build();

        let parent_handle = parent.run().unwrap();
        let child_handle = child.run().unwrap();

        parent.stop();
        tokio::time::timeout(timeout(), async {
            child_handle.wait().await.unwrap();
            parent_handle.wait().await.unwrap();
        })
        .await
        .expect("both apps stop");
        assert_eq!(child.state(), RunState::Shutdown);
    }

    // ── Callback recovery ────────────────────────────────────

    #[tokio::test]
    async fn recovered_panics_reach_the_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let app = App::builder(Context::new())
            .with_lifecycle(Arc::new(PanicOn(Stage::Stop)))
            .with_error_sink(tx)
            .build();
        let mut events = app.bus().subscribe();

        let handle = app.run().unwrap();
        app.stop();
        handle.wait().await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(RuntimeError::CallbackPanicked {
                stage: Stage::Stop,
                message: "stop failed".into()
            })
        );
        let ev = next_kind(&mut events, EventKind::CallbackPanicked).await;
        assert_eq!(ev.stage, Some(Stage::Stop));
        assert_eq!(app.state(), RunState::Shutdown);
    }

    #[tokio::test]
    async fn recovered_start_panic_keeps_the_app_running() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let app = App::builder(Context::new())
            .with_lifecycle(Arc::new(PanicOn(Stage::Start)))
            .with_error_sink(tx)
            .build();

        let handle = app.run().unwrap();
        let err = rx.recv().await.unwrap();
        assert_eq!(err.as_label(), "runtime_callback_panicked");
        assert_eq!(app.state(), RunState::Running);

        app.stop();
        handle.wait().await.unwrap();
    }

    #[tokio::test]
    async fn unrecovered_start_panic_kills_the_run_loop() {
        let parent = Context::new();
        let app = App::builder(Context::supervised_by(&parent))
            .with_config(AppConfig {
                auto_recover: false,
                ..AppConfig::default()
            })
            .with_lifecycle(Arc::new(PanicOn(Stage::Start)))
            .build();

        let err = app.run().unwrap().wait().await.unwrap_err();
        assert_eq!(
            err,
            RuntimeError::RunLoopPanicked {
                message: "start failed".into()
            }
        );
        assert_eq!(app.state(), RunState::Shutdown);
        assert!(parent.wait_group().is_empty());
    }

    #[tokio::test]
    async fn unrecovered_start_panic_still_drains_subscribers() {
        let kinds = Arc::new(Kinds::default());
        let app = App::builder(Context::new())
            .with_config(AppConfig {
                auto_recover: false,
                ..AppConfig::default()
            })
            .with_lifecycle(Arc::new(PanicOn(Stage::Start)))
            .with_subscribers(vec![kinds.clone()])
            .build();

        let err = app.run().unwrap().wait().await.unwrap_err();
        assert!(matches!(err, RuntimeError::RunLoopPanicked { .. }));
        assert_eq!(app.state(), RunState::Shutdown);

        // the listener finished before the handle resolved
        assert_eq!(
            *kinds.0.lock(),
            [EventKind::AppStarting, EventKind::AppShutdown]
        );
    }

    #[test]
    #[should_panic(expected = "init failed")]
    fn unrecovered_init_panic_reaches_the_builder() {
        struct BadInit;
        impl AppLifecycle for BadInit {
            fn on_init(&self, _app: &App) {
                panic!("init failed");
            }
        }
        let _ = App::builder(Context::new())
            .with_config(AppConfig {
                auto_recover: false,
                ..AppConfig::default()
            })
            .with_lifecycle(Arc::new(BadInit))
            .build();
    }

    // ── Entities ─────────────────────────────────────────────

    #[tokio::test]
    async fn entity_operations_publish_events() {
        let app = App::builder(Context::new())
            .with_config(AppConfig::default().with_name("world"))
            .build();
        let mut events = app.bus().subscribe();

        let id = app.make_uid();
        assert_eq!(id.get(), 1);
        app.add_entity(Arc::new(Thing { id })).unwrap();
        assert!(app.contains_entity(id));
        assert_eq!(
            app.add_entity(Arc::new(Thing { id })),
            Err(RuntimeError::DuplicateEntity { id })
        );
        assert_eq!(app.entity_count(), 1);

        let ev = next_kind(&mut events, EventKind::EntityAdded).await;
        assert_eq!(ev.entity, Some(id));
        assert_eq!(ev.app.as_deref(), Some("world"));

        let found = app.get_entity(id).unwrap();
        assert!(found.downcast_ref::<Thing>().is_some());

        assert!(app.remove_entity(id).is_some());
        assert!(app.remove_entity(id).is_none());
        let ev = next_kind(&mut events, EventKind::EntityRemoved).await;
        assert_eq!(ev.entity, Some(id));

        let mut n = 0;
        app.range_entities(|_| {
            n += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(n, 0);
    }

    // ── Observability ────────────────────────────────────────

    #[derive(Default)]
    struct Kinds(Mutex<Vec<EventKind>>);

    #[async_trait::async_trait]
    impl Subscribe for Kinds {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().push(ev.kind);
        }
    }

    #[tokio::test]
    async fn subscribers_see_the_full_lifecycle() {
        let kinds = Arc::new(Kinds::default());
        let app = App::builder(Context::new())
            .with_subscribers(vec![kinds.clone()])
            .build();

        let handle = app.run().unwrap();
        app.wait_for(RunState::Running).await;
        app.stop();
        handle.wait().await.unwrap();

        assert_eq!(
            *kinds.0.lock(),
            [
                EventKind::AppStarting,
                EventKind::AppRunning,
                EventKind::AppShuttingDown,
                EventKind::AppShutdown,
            ]
        );
    }
}
