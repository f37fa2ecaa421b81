//! # EventSource: the emitter side of a binding.
//!
//! An event-source type embeds an [`EventSourceCore`] holding its listeners in
//! priority order.
//!
//! ## Layout
//! ```text
//! EventSourceCore
//! └─ RwLock<Listeners>
//!    ├─ arena:   Arena<Listener>        (hook id, Weak<dyn Hook>, priority)
//!    ├─ order:   Vec<Index>             sorted by (priority asc, bind order)
//!    └─ by_hook: HashMap<Uid, Index>    duplicate detection / removal
//! ```
//!
//! Dispatch copies `order` and resolves each [`Index`] again right before the
//! visit. An index whose listener was removed in the meantime no longer
//! resolves (the arena's generation check rejects it), so an unbound hook is
//! never visited and a recycled slot is never mistaken for the old listener.
//!
//! ## Rules
//! - Mutation takes the write lock; dispatch only takes short read locks and
//!   never holds one while user code runs.
//! - Same priority keeps FIFO (bind) order.
//! - Listeners are weak: an event source never keeps a hook alive.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use generational_arena::{Arena, Index};
use parking_lot::RwLock;

use super::hook::Hook;
use crate::uid::Uid;

/// Dispatch priority. Lower values are visited first.
pub type Priority = i32;

/// Priority used by [`bind_event_default`](crate::bind_event_default).
pub const DEFAULT_PRIORITY: Priority = 0;

/// Emitter with a priority-ordered collection of bound hooks.
///
/// # Example
/// ```
/// use appvisor::{EventSource, EventSourceCore};
///
/// struct OnDamage { core: EventSourceCore }
///
/// impl EventSource for OnDamage {
///     fn event_source_core(&self) -> &EventSourceCore { &self.core }
/// }
///
/// let s = OnDamage { core: EventSourceCore::new() };
/// assert!(s.core.is_empty());
/// ```
pub trait EventSource: Any + Send + Sync {
    /// Binding state embedded in the implementor.
    fn event_source_core(&self) -> &EventSourceCore;

    /// Identifier of this event source.
    fn event_source_id(&self) -> Uid {
        self.event_source_core().id()
    }
}

impl dyn EventSource {
    /// Returns true if the source's concrete type is `T`.
    pub fn is<T: EventSource>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Borrows the source as its concrete type `T`.
    pub fn downcast_ref<T: EventSource>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

struct Listener {
    hook_id: Uid,
    hook: Weak<dyn Hook>,
    priority: Priority,
}

#[derive(Default)]
struct Listeners {
    arena: Arena<Listener>,
    order: Vec<Index>,
    by_hook: HashMap<Uid, Index>,
}

/// Identifier plus the ordered listener collection.
pub struct EventSourceCore {
    id: Uid,
    listeners: RwLock<Listeners>,
}

impl EventSourceCore {
    /// Creates a core with a fresh process-unique identifier.
    pub fn new() -> Self {
        Self {
            id: Uid::next_global(),
            listeners: RwLock::new(Listeners::default()),
        }
    }

    /// Identifier of the owning event source.
    pub fn id(&self) -> Uid {
        self.id
    }

    /// Number of bound hooks.
    pub fn len(&self) -> usize {
        self.listeners.read().order.len()
    }

    /// Returns true if no hook is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the hook `hook_id` is bound.
    pub fn contains(&self, hook_id: Uid) -> bool {
        self.listeners.read().by_hook.contains_key(&hook_id)
    }

    /// Inserts a listener after every listener with priority `<= priority`.
    ///
    /// Returns false if the hook is already bound.
    pub(crate) fn add_hook(&self, hook_id: Uid, hook: Weak<dyn Hook>, priority: Priority) -> bool {
        let mut guard = self.listeners.write();
        let l = &mut *guard;
        if l.by_hook.contains_key(&hook_id) {
            return false;
        }

        let idx = l.arena.insert(Listener {
            hook_id,
            hook,
            priority,
        });
        let arena = &l.arena;
        let pos = l
            .order
            .iter()
            .position(|i| arena.get(*i).is_some_and(|other| other.priority > priority))
            .unwrap_or(l.order.len());
        l.order.insert(pos, idx);
        l.by_hook.insert(hook_id, idx);
        true
    }

    /// Removes a listener. Returns false if the hook was not bound.
    pub(crate) fn remove_hook(&self, hook_id: Uid) -> bool {
        let mut guard = self.listeners.write();
        let l = &mut *guard;
        let Some(idx) = l.by_hook.remove(&hook_id) else {
            return false;
        };
        l.arena.remove(idx);
        l.order.retain(|i| *i != idx);
        true
    }

    /// Copies the current dispatch order.
    pub(crate) fn snapshot_order(&self) -> Vec<Index> {
        self.listeners.read().order.clone()
    }

    /// Resolves a handle from [`snapshot_order`](Self::snapshot_order).
    ///
    /// Returns `None` if the listener was removed since the snapshot or the
    /// hook has been dropped. The upgrade happens after the lock is released.
    pub(crate) fn resolve(&self, idx: Index) -> Option<Arc<dyn Hook>> {
        let weak = {
            let l = self.listeners.read();
            Weak::clone(&l.arena.get(idx)?.hook)
        };
        weak.upgrade()
    }

    /// Copies the current listeners in dispatch order.
    pub(crate) fn snapshot_hooks(&self) -> Vec<(Uid, Weak<dyn Hook>, Priority)> {
        let l = self.listeners.read();
        l.order
            .iter()
            .filter_map(|i| l.arena.get(*i))
            .map(|li| (li.hook_id, Weak::clone(&li.hook), li.priority))
            .collect()
    }
}

impl Default for EventSourceCore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventSourceCore {
    fn drop(&mut self) {
        let l = std::mem::take(self.listeners.get_mut());
        for listener in l.arena {
            if let Some(hook) = listener.hook.upgrade() {
                hook.hook_core().detach(self.id);
            }
        }
    }
}

impl fmt::Debug for EventSourceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSourceCore")
            .field("id", &self.id)
            .field("listeners", &self.len())
            .finish()
    }
}
