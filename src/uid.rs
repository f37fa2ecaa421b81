//! # Unique identifiers.
//!
//! [`Uid`] is a non-zero 64-bit identifier; `0` is reserved as "invalid" and
//! therefore unrepresentable. [`UidMaker`] hands out strictly increasing
//! identifiers starting from 1 with a lock-free atomic update, so any number of
//! concurrent callers never observe the same value.
//!
//! Entities get their identifiers from [`App::make_uid`](crate::App::make_uid).
//! Hooks and event sources draw from a process-wide maker via [`Uid::next_global`].

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide generator used by hooks and event sources.
static GLOBAL_UIDS: UidMaker = UidMaker::new();

/// Non-zero, process-lifetime-unique identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(NonZeroU64);

impl Uid {
    /// The smallest valid identifier (`1`).
    pub const MIN: Uid = Uid(NonZeroU64::MIN);

    /// Wraps a raw value; returns `None` for the reserved value `0`.
    #[inline]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(v) => Some(Uid(v)),
            None => None,
        }
    }

    /// Returns the raw value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Draws a fresh identifier from the process-wide generator.
    pub fn next_global() -> Self {
        GLOBAL_UIDS.next()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uid> for u64 {
    fn from(uid: Uid) -> Self {
        uid.get()
    }
}

/// Lock-free monotonic identifier generator.
///
/// # Example
/// ```
/// use appvisor::UidMaker;
///
/// let maker = UidMaker::new();
/// assert_eq!(maker.next().get(), 1);
/// assert_eq!(maker.next().get(), 2);
/// ```
#[derive(Debug, Default)]
pub struct UidMaker {
    last: AtomicU64,
}

impl UidMaker {
    /// Creates a generator whose first identifier is `1`.
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Returns the next identifier.
    ///
    /// # Panics
    /// Panics once all 2^64 - 1 identifiers have been handed out.
    pub fn next(&self) -> Uid {
        // never wraps: an exhausted maker keeps failing instead of reissuing 1
        let issued = self
            .last
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_add(1))
            .ok()
            .and_then(|prev| Uid::new(prev + 1));
        match issued {
            Some(uid) => uid,
            None => panic!("uid space exhausted"),
        }
    }

    /// Returns the most recently issued raw value (`0` if none yet).
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
