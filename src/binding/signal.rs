//! Ready-made named event source.

use std::borrow::Cow;
use std::sync::Arc;

use super::source::{EventSource, EventSourceCore};

/// Event source that carries nothing but a name.
///
/// Useful when an event has no natural owner object (ticks, broadcasts).
///
/// # Example
/// ```
/// use appvisor::{EventSource, Signal};
///
/// let tick = Signal::new("tick");
/// assert_eq!(tick.name(), "tick");
/// assert!(tick.event_source_core().is_empty());
/// ```
#[derive(Debug)]
pub struct Signal {
    name: Cow<'static, str>,
    core: EventSourceCore,
}

impl Signal {
    /// Creates a shared signal; hooks are bound through the returned `Arc`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            core: EventSourceCore::new(),
        })
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl EventSource for Signal {
    fn event_source_core(&self) -> &EventSourceCore {
        &self.core
    }
}
