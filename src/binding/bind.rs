//! # Binding protocol and dispatch.
//!
//! ## Bind (all-or-nothing)
//! ```text
//! bind_event(hook, source, prio)
//!   lock hook attachments
//!   ├─► already attached                    ─► Err(AlreadyBound), nothing changed
//!   ├─► source.add_hook(hook) already there ─► Err(AlreadyBound), nothing recorded
//!   └─► record attachment, unlock
//! ```
//!
//! ## Unbind
//! Under the same lock: `source.remove_hook(hook)` then drop the attachment.
//! Missing halves are no-ops.
//!
//! ## Dispatch
//! ```text
//! send_event(source, visitor)
//!   order = snapshot of handles (priority asc, bind order)
//!   for idx in order:
//!       resolve(idx) ── removed/dropped ─► skip
//!       visitor(hook) ── Break ─► stop
//! ```
//!
//! ## Rules
//! - No lock is held while a visitor runs; visitors may bind and unbind freely.
//! - A hook unbound during dispatch is not visited afterwards.
//! - A hook bound during dispatch is not visited by that dispatch.
//! - Bind and unbind of one pair are serialized by the hook's lock, so a
//!   binding is never left recorded on one side only.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use super::hook::{Hook, HookCore};
use super::source::{DEFAULT_PRIORITY, EventSource, EventSourceCore, Priority};
use crate::error::BindError;

/// Binds `hook` to `source` at `priority`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use appvisor::{bind_event, BindError, EventSource, EventSourceCore, Hook, HookCore};
///
/// struct H { core: HookCore }
/// impl Hook for H { fn hook_core(&self) -> &HookCore { &self.core } }
/// struct S { core: EventSourceCore }
/// impl EventSource for S { fn event_source_core(&self) -> &EventSourceCore { &self.core } }
///
/// let h = Arc::new(H { core: HookCore::new() });
/// let s = Arc::new(S { core: EventSourceCore::new() });
///
/// bind_event(&h, &s, 10).unwrap();
/// assert!(matches!(bind_event(&h, &s, 10), Err(BindError::AlreadyBound { .. })));
/// assert_eq!(h.core.attached_count(), 1);
/// ```
pub fn bind_event<H, S>(hook: &Arc<H>, source: &Arc<S>, priority: Priority) -> Result<(), BindError>
where
    H: Hook,
    S: EventSource,
{
    let hook_ref = Arc::downgrade(hook);
    let hook_ref: Weak<dyn Hook> = hook_ref;
    let source_ref = Arc::downgrade(source);
    let source_ref: Weak<dyn EventSource> = source_ref;
    bind_cores(
        hook.hook_core(),
        hook_ref,
        source.event_source_core(),
        source_ref,
        priority,
    )
}

/// [`bind_event`] at [`DEFAULT_PRIORITY`].
pub fn bind_event_default<H, S>(hook: &Arc<H>, source: &Arc<S>) -> Result<(), BindError>
where
    H: Hook,
    S: EventSource,
{
    bind_event(hook, source, DEFAULT_PRIORITY)
}

/// [`bind_event`] for callers holding trait objects.
pub fn bind_event_dyn(
    hook: &Arc<dyn Hook>,
    source: &Arc<dyn EventSource>,
    priority: Priority,
) -> Result<(), BindError> {
    bind_cores(
        hook.hook_core(),
        Arc::downgrade(hook),
        source.event_source_core(),
        Arc::downgrade(source),
        priority,
    )
}

fn bind_cores(
    hook: &HookCore,
    hook_ref: Weak<dyn Hook>,
    source: &EventSourceCore,
    source_ref: Weak<dyn EventSource>,
    priority: Priority,
) -> Result<(), BindError> {
    let hook_id = hook.id();
    let err = BindError::AlreadyBound {
        hook: hook_id,
        event_source: source.id(),
    };

    let attached = hook.attach_with(source.id(), source_ref, || {
        let added = source.add_hook(hook_id, hook_ref, priority);
        if !added {
            tracing::debug!(
                hook = %hook_id,
                source = %source.id(),
                "bind refused: source already lists hook"
            );
        }
        added
    });

    if attached { Ok(()) } else { Err(err) }
}

/// Removes the binding between `hook` and `source` on both sides.
///
/// Unbinding a pair that is not bound is a no-op.
pub fn unbind_event<H, S>(hook: &Arc<H>, source: &Arc<S>)
where
    H: Hook + ?Sized,
    S: EventSource + ?Sized,
{
    unbind_cores(hook.hook_core(), source.event_source_core());
}

fn unbind_cores(hook: &HookCore, source: &EventSourceCore) {
    let hook_id = hook.id();
    hook.detach_with(source.id(), || {
        source.remove_hook(hook_id);
    });
}

/// Unbinds `hook` from every event source it is attached to.
///
/// Works on a snapshot of the attachments taken at call time; each source in
/// the snapshot is unbound exactly once. Sources that have been dropped are
/// only detached.
pub fn unbind_all_event_sources<H>(hook: &Arc<H>)
where
    H: Hook + ?Sized,
{
    let core = hook.hook_core();
    for (source_id, source) in core.snapshot_sources() {
        match source.upgrade() {
            Some(source) => unbind_cores(core, source.event_source_core()),
            None => {
                core.detach(source_id);
            }
        }
    }
}

/// Unbinds every hook bound to `source`.
///
/// Symmetric to [`unbind_all_event_sources`].
pub fn unbind_all_hooks<S>(source: &Arc<S>)
where
    S: EventSource + ?Sized,
{
    let core = source.event_source_core();
    for (hook_id, hook, _) in core.snapshot_hooks() {
        match hook.upgrade() {
            Some(hook) => unbind_cores(hook.hook_core(), core),
            None => {
                core.remove_hook(hook_id);
            }
        }
    }
}

/// Visits the hooks bound to `source` in ascending priority, ties in bind order.
///
/// The visitor returns [`ControlFlow::Break`] to stop the dispatch.
pub fn send_event<S, F>(source: &Arc<S>, mut visitor: F)
where
    S: EventSource + ?Sized,
    F: FnMut(&Arc<dyn Hook>) -> ControlFlow<()>,
{
    let core = source.event_source_core();
    for idx in core.snapshot_order() {
        let Some(hook) = core.resolve(idx) else {
            continue;
        };
        if visitor(&hook).is_break() {
            break;
        }
    }
}

/// Like [`send_event`], but only visits hooks whose concrete type is `T`.
///
/// # Example
/// ```
/// use std::ops::ControlFlow;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use appvisor::{bind_event_default, send_event_as, Hook, HookCore, Signal};
///
/// struct Counter { core: HookCore, hits: AtomicU32 }
/// impl Hook for Counter { fn hook_core(&self) -> &HookCore { &self.core } }
///
/// let tick = Signal::new("tick");
/// let c = Arc::new(Counter { core: HookCore::new(), hits: AtomicU32::new(0) });
/// bind_event_default(&c, &tick).unwrap();
///
/// send_event_as::<Counter, _, _>(&tick, |c| {
///     c.hits.fetch_add(1, Ordering::Relaxed);
///     ControlFlow::Continue(())
/// });
/// assert_eq!(c.hits.load(Ordering::Relaxed), 1);
/// ```
pub fn send_event_as<T, S, F>(source: &Arc<S>, mut visitor: F)
where
    T: Hook,
    S: EventSource + ?Sized,
    F: FnMut(&T) -> ControlFlow<()>,
{
    send_event(source, |hook| match hook.downcast_ref::<T>() {
        Some(hook) => visitor(hook),
        None => ControlFlow::Continue(()),
    });
}
