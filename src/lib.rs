//! # appvisor
//!
//! **Appvisor** is a small application runtime for entity-based programs
//! (games, simulations, service shells).
//!
//! It provides a lifecycle-managed [`App`] that owns a registry of entities,
//! hierarchical cancellation that gates a parent's shutdown on its children,
//! and a prioritized many-to-many binding between listeners ([`Hook`]) and
//! emitters ([`EventSource`]).
//!
//! ## Architecture
//! ### Overview
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  App                                                              │
//! │  - Context   (cancellation token + WaitGroup + weak parent link)  │
//! │  - Runnable  (Idle → Running → ShuttingDown → Shutdown)           │
//! │  - EntityRegistry (Uid → Arc<dyn Entity>)  + UidMaker             │
//! │  - Bus ──► SubscriberSet (per-subscriber queues)                  │
//! │  - AppLifecycle (on_init / on_start / on_stop)                    │
//! └──────┬───────────────────────────────────────────────┬────────────┘
//!        │ holds one WorkUnit on                         │ entities are
//!        ▼                                               ▼ Hooks and/or EventSources
//! ┌──────────────┐                          Hook ◄──── bind_event ────► EventSource
//! │ parent App   │                      (HookCore)   (weak both ways)  (EventSourceCore)
//! │ (shutdown    │                                                           │
//! │  waits)      │                                   send_event(visitor) ◄───┘
//! └──────────────┘                                   priority asc, then bind order
//! ```
//!
//! ### Lifecycle
//! ```text
//! App::builder(ctx).build()   ──► on_init
//! app.run()                   ──► Running, spawn run loop:
//!     on_start
//!     ctx.done().await        ◄── app.stop() | parent cancel (child_of) | OS signal
//!     ShuttingDown
//!     ctx.wait_group().wait() ◄── WorkUnits, spawned work, child apps
//!     on_stop
//!     Shutdown                ──► parent unit released, RunHandle completes
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / functions                         |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------|
//! | **Runtime**       | Run loop, lifecycle callbacks, callback panic recovery.      | [`App`], [`AppBuilder`], [`AppLifecycle`]     |
//! | **Cancellation**  | Hierarchical contexts, supervised work counting.             | [`Context`], [`WaitGroup`], [`Runnable`]      |
//! | **Entities**      | Concurrent registry with duplicate rejection.                | [`Entity`], [`EntityRegistry`], [`Uid`]       |
//! | **Binding**       | Prioritized hook/event-source binding with re-entrant dispatch. | [`bind_event`], [`send_event`], [`Signal`] |
//! | **Observability** | Runtime events and subscribers.                              | [`Bus`], [`Event`], [`Subscribe`]             |
//! | **Errors**        | Typed errors with stable labels.                             | [`RuntimeError`], [`BindError`]               |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber writing events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::ops::ControlFlow;
//! use std::sync::Arc;
//! use appvisor::{
//!     App, Context, Entity, EventSource, EventSourceCore, Hook, HookCore, Uid,
//!     bind_event, send_event_as,
//! };
//!
//! struct Player { id: Uid, source: EventSourceCore }
//! impl Entity for Player { fn entity_id(&self) -> Uid { self.id } }
//! impl EventSource for Player { fn event_source_core(&self) -> &EventSourceCore { &self.source } }
//!
//! struct Shield { core: HookCore }
//! impl Hook for Shield { fn hook_core(&self) -> &HookCore { &self.core } }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::builder(Context::new()).build();
//!     let handle = app.run()?;
//!
//!     let player = Arc::new(Player { id: app.make_uid(), source: EventSourceCore::new() });
//!     app.add_entity(player.clone())?;
//!
//!     let shield = Arc::new(Shield { core: HookCore::new() });
//!     bind_event(&shield, &player, 0)?;
//!
//!     let mut absorbed = 0;
//!     send_event_as::<Shield, _, _>(&player, |_| {
//!         absorbed += 1;
//!         ControlFlow::Break(())
//!     });
//!     assert_eq!(absorbed, 1);
//!
//!     app.stop();
//!     handle.wait().await?;
//!     Ok(())
//! }
//! ```

mod app;
mod binding;
mod context;
mod entities;
mod error;
mod events;
mod subscribers;
mod uid;

// ---- Public re-exports ----

pub use app::{
    App, AppBuilder, AppConfig, AppLifecycle, NoopLifecycle, RunHandle, wait_for_shutdown_signal,
};
pub use binding::{
    DEFAULT_PRIORITY, EventSource, EventSourceCore, Hook, HookCore, Priority, Signal, bind_event,
    bind_event_default, bind_event_dyn, send_event, send_event_as, unbind_all_event_sources,
    unbind_all_hooks, unbind_event,
};
pub use context::{CancelFn, Context, RunState, Runnable, WaitGroup, WorkUnit};
pub use entities::{Entity, EntityRegistry};
pub use error::{BindError, RuntimeError, Stage};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use uid::{Uid, UidMaker};

// Optional: expose a built-in subscriber writing events through `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
