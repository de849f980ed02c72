//! Task and time primitives.
//!
//! Every concurrent operator in the crate runs its helpers inside a
//! [`TaskScope`]: a group of OS threads that shares one [`CancelToken`] and is
//! joined before the owning subscription is released. Timer waits go through
//! [`sleep`], which wakes early when the current task is cancelled.

mod cancel;
mod scope;

pub use std::time::{Duration, Instant};

pub use cancel::CancelToken;
pub use scope::{live_tasks, TaskScope};

/// Sleeps on the current thread, observing the current task's token.
///
/// Returns `false` if the wait was interrupted by cancellation.
pub fn sleep(duration: Duration) -> bool { CancelToken::current().sleep(duration) }
