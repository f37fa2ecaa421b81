//! # Hook: the listener side of a binding.
//!
//! A hook type embeds a [`HookCore`] and exposes it through
//! [`Hook::hook_core`]. The core records which event sources the hook is
//! attached to so that [`unbind_all_event_sources`](crate::unbind_all_event_sources)
//! can detach it in bulk.
//!
//! ## Rules
//! - Attachments are weak: a hook never keeps an event source alive.
//! - Only the binding functions mutate the attachment set.
//! - Bind and unbind hold the attachment lock while they touch the source, so
//!   the two halves of one pair change together. Lock order is hook, then
//!   source; the drop paths never hold both.
//! - Dropping the core detaches the hook from every source still alive, so a
//!   dropped hook never lingers as a one-sided binding.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Weak;

use parking_lot::Mutex;

use super::source::EventSource;
use crate::uid::Uid;

/// Listener that can be bound to any number of event sources.
///
/// # Example
/// ```
/// use appvisor::{Hook, HookCore};
///
/// struct Audit { core: HookCore }
///
/// impl Hook for Audit {
///     fn hook_core(&self) -> &HookCore { &self.core }
/// }
///
/// let a = Audit { core: HookCore::new() };
/// assert_eq!(a.hook_id(), a.core.id());
/// ```
pub trait Hook: Any + Send + Sync {
    /// Binding state embedded in the implementor.
    fn hook_core(&self) -> &HookCore;

    /// Identifier of this hook.
    fn hook_id(&self) -> Uid {
        self.hook_core().id()
    }
}

impl dyn Hook {
    /// Returns true if the hook's concrete type is `T`.
    pub fn is<T: Hook>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Borrows the hook as its concrete type `T`.
    pub fn downcast_ref<T: Hook>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Identifier plus the set of attached event sources.
pub struct HookCore {
    id: Uid,
    sources: Mutex<HashMap<Uid, Weak<dyn EventSource>>>,
}

impl HookCore {
    /// Creates a core with a fresh process-unique identifier.
    pub fn new() -> Self {
        Self {
            id: Uid::next_global(),
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Identifier of the owning hook.
    pub fn id(&self) -> Uid {
        self.id
    }

    /// Number of event sources this hook is attached to.
    pub fn attached_count(&self) -> usize {
        self.sources.lock().len()
    }

    /// Returns true if the hook is attached to the source `source_id`.
    pub fn is_attached(&self, source_id: Uid) -> bool {
        self.sources.lock().contains_key(&source_id)
    }

    /// Records an attachment to `source_id` if `add` succeeds.
    ///
    /// `add` runs under the attachment lock and is skipped when the hook is
    /// already attached. Returns false if nothing was recorded.
    pub(crate) fn attach_with(
        &self,
        source_id: Uid,
        source: Weak<dyn EventSource>,
        add: impl FnOnce() -> bool,
    ) -> bool {
        let mut sources = self.sources.lock();
        if sources.contains_key(&source_id) || !add() {
            return false;
        }
        sources.insert(source_id, source);
        true
    }

    /// Runs `remove` and drops the attachment to `source_id` under one lock.
    pub(crate) fn detach_with(&self, source_id: Uid, remove: impl FnOnce()) {
        let mut sources = self.sources.lock();
        remove();
        sources.remove(&source_id);
    }

    /// Removes an attachment. Returns false if it did not exist.
    pub(crate) fn detach(&self, source_id: Uid) -> bool {
        self.sources.lock().remove(&source_id).is_some()
    }

    /// Copies the current attachments; the lock is released on return.
    pub(crate) fn snapshot_sources(&self) -> Vec<(Uid, Weak<dyn EventSource>)> {
        self.sources
            .lock()
            .iter()
            .map(|(id, s)| (*id, Weak::clone(s)))
            .collect()
    }
}

impl Default for HookCore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HookCore {
    fn drop(&mut self) {
        for (_, source) in self.sources.get_mut().drain() {
            if let Some(source) = source.upgrade() {
                source.event_source_core().remove_hook(self.id);
            }
        }
    }
}

impl fmt::Debug for HookCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCore")
            .field("id", &self.id)
            .field("attached", &self.attached_count())
            .finish()
    }
}
