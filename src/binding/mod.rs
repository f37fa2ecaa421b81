//! # Hook / event-source binding.
//!
//! A many-to-many association between listeners ([`Hook`]) and emitters
//! ([`EventSource`]) with priority-ordered, re-entrant dispatch.
//!
//! ```text
//!   Hook (HookCore)                      EventSource (EventSourceCore)
//!   ┌──────────────────────┐             ┌────────────────────────────────┐
//!   │ sources: {id → Weak} │◄── bind ───►│ listeners: [(prio, Weak hook)] │
//!   └──────────────────────┘             └────────────────────────────────┘
//!                                                    │
//!                                              send_event(visitor)
//!                                                    ▼
//!                                       hooks in (priority asc, bind order)
//! ```
//!
//! Both sides hold weak references only; dropping either side cleans up the
//! other. Bindings are always symmetric: a failed [`bind_event`] leaves no trace.

mod bind;
mod hook;
mod signal;
mod source;

pub use bind::{
    bind_event, bind_event_default, bind_event_dyn, send_event, send_event_as,
    unbind_all_event_sources, unbind_all_hooks, unbind_event,
};
pub use hook::{Hook, HookCore};
pub use signal::Signal;
pub use source::{DEFAULT_PRIORITY, EventSource, EventSourceCore, Priority};
