//! # Hierarchical cancellation and shutdown synchronization.
//!
//! A [`Context`] bundles:
//! - a one-shot, idempotent cancellation signal ([`CancellationToken`]);
//! - a [`WaitGroup`] counting the work this context supervises;
//! - an optional *weak* link to a parent context.
//!
//! ```text
//!            parent Context
//!            ├─ token ─────────────┐ child_token()   (child_of only)
//!            └─ wait_group ◄─────┐ │
//!                                │ ▼
//!  child Context ── run loop holds one WorkUnit on the parent
//!                   until the child reaches Shutdown
//! ```
//!
//! Supervision flows *upward* (a parent's shutdown waits for its children);
//! cancellation flows *downward* only for contexts built with
//! [`Context::child_of`].

use std::fmt;
use std::sync::{Arc, Weak};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::wait_group::WaitGroup;

/// Cancellation + supervision handle. Cloning shares the same context.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    parent: Option<Weak<ContextInner>>,
    token: CancellationToken,
    wait_group: WaitGroup,
}

/// Clonable cancellation trigger detached from the [`Context`] handle.
#[derive(Clone, Debug)]
pub struct CancelFn(CancellationToken);

impl CancelFn {
    /// Raises the cancellation signal. Idempotent.
    pub fn cancel(&self) {
        self.0.cancel();
    }
}

impl Context {
    /// Creates a root context.
    pub fn new() -> Self {
        Self::build(None, CancellationToken::new())
    }

    /// Creates a context supervised by `parent` that is also canceled when
    /// `parent` is canceled.
    ///
    /// # Example
    /// ```
    /// use appvisor::Context;
    ///
    /// let root = Context::new();
    /// let child = Context::child_of(&root);
    /// root.cancel();
    /// assert!(child.is_done());
    /// ```
    pub fn child_of(parent: &Context) -> Self {
        Self::build(
            Some(Arc::downgrade(&parent.inner)),
            parent.inner.token.child_token(),
        )
    }

    /// Creates a context supervised by `parent` with its own, independent
    /// cancellation signal.
    ///
    /// # Example
    /// ```
    /// use appvisor::Context;
    ///
    /// let root = Context::new();
    /// let child = Context::supervised_by(&root);
    /// root.cancel();
    /// assert!(!child.is_done());
    /// assert!(child.parent().is_some());
    /// ```
    pub fn supervised_by(parent: &Context) -> Self {
        Self::build(Some(Arc::downgrade(&parent.inner)), CancellationToken::new())
    }

    fn build(parent: Option<Weak<ContextInner>>, token: CancellationToken) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                parent,
                token,
                wait_group: WaitGroup::new(),
            }),
        }
    }

    /// Returns the parent context if one was linked and is still alive.
    pub fn parent(&self) -> Option<Context> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Context { inner })
    }

    /// Supervised-work counter of this context.
    pub fn wait_group(&self) -> &WaitGroup {
        &self.inner.wait_group
    }

    /// Completes once the context is canceled.
    pub fn done(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Returns true once the context is canceled. Never reverts.
    pub fn is_done(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Raises the cancellation signal. Idempotent.
    pub fn cancel(&self) {
        self.inner.token.cancel();
    }

    /// Returns a clonable trigger for this context's cancellation signal.
    pub fn cancel_fn(&self) -> CancelFn {
        CancelFn(self.inner.token.clone())
    }

    /// Underlying token, for interop with code built on `tokio_util`.
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Returns true if both handles refer to the same context.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_parent", &self.inner.parent.is_some())
            .field("done", &self.is_done())
            .field("outstanding", &self.inner.wait_group.len())
            .finish()
    }
}
