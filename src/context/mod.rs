//! Cancellation contexts and lifecycle state.
//!
//! - [`Context`]: hierarchical cancellation + supervision handle;
//! - [`WaitGroup`] / [`WorkUnit`]: supervised-work counter;
//! - [`Runnable`] / [`RunState`]: `Idle → Running → ShuttingDown → Shutdown`.

#[allow(clippy::module_inception)]
mod context;
mod runnable;
mod wait_group;

pub use context::{CancelFn, Context};
pub use runnable::{RunState, Runnable};
pub use wait_group::{WaitGroup, WorkUnit};
