//! Retry operator implementation
//!
//! `retry` resubscribes to its source from scratch when the run fails, as
//! directed by a [`RetryPolicy`]. Nothing is checkpointed: every attempt is a
//! brand-new subscription, so values emitted before the failure are emitted
//! again by the next attempt.
//!
//! # Examples
//!
//! Simple retry with count:
//!
//! ```rust
//! use std::sync::{
//!   atomic::{AtomicUsize, Ordering},
//!   Arc,
//! };
//!
//! use rxflow::prelude::*;
//!
//! let attempts = Arc::new(AtomicUsize::new(0));
//! let source = {
//!   let attempts = attempts.clone();
//!   observable::create(move || {
//!     let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
//!     if n < 3 { vec![Err(RxError::msg("flaky"))] } else { vec![Ok(1)] }
//!   })
//! };
//!
//! let values: Vec<_> = source.retry(3).subscribe().flatten().collect();
//! assert_eq!(values, vec![1]);
//! assert_eq!(attempts.load(Ordering::SeqCst), 3);
//! ```
//!
//! Advanced retry with `RetryConfig`:
//!
//! ```rust
//! use rxflow::{ops::retry::RetryConfig, prelude::*};
//!
//! let mut sub = observable::throw_err::<(), _>(|| RxError::msg("always fails"))
//!   .retry(
//!     RetryConfig::new()
//!       .count(3)
//!       .delay(Duration::from_millis(1))
//!       .reset_on_success(),
//!   )
//!   .subscribe();
//! assert!(sub.next().unwrap().is_err());
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::{
  error::RxError,
  observable::Observable,
  scheduler::{self, Duration},
  subscription::Subscription,
};

/// Policy for determining whether to retry an error.
///
/// Simple policies like `usize` (count) and complex policies like
/// `RetryConfig` (count + delay + reset) are supported. Users can also
/// implement this trait for custom retry logic.
///
/// # Custom Policy Example
///
/// ```rust
/// use rxflow::{error::ErrorKind, ops::retry::RetryPolicy, prelude::*};
///
/// #[derive(Clone)]
/// struct RetryTimeouts;
///
/// impl RetryPolicy for RetryTimeouts {
///   fn should_retry(&self, err: &RxError, attempt: usize) -> Option<Duration> {
///     if attempt >= 3 {
///       return None;
///     }
///     match err.kind() {
///       ErrorKind::Timeout => Some(Duration::from_millis(500)),
///       _ => None,
///     }
///   }
/// }
/// ```
pub trait RetryPolicy: Clone + Send + Sync + 'static {
  /// Determines if a retry should occur and the delay before retrying.
  ///
  /// # Arguments
  ///
  /// * `err` - The error that occurred.
  /// * `attempt` - The number of retries already attempted (0-indexed).
  ///   - 0 means this is the first error (first retry check).
  ///   - 1 means this is the second error, etc.
  ///
  /// # Returns
  ///
  /// * `Some(duration)` - Retry after the specified duration.
  /// * `None` - Do not retry, propagate the error.
  fn should_retry(&self, err: &RxError, attempt: usize) -> Option<Duration>;

  /// Whether to reset the retry count when a value is successfully emitted.
  fn reset_on_success(&self) -> bool { false }
}

impl RetryPolicy for usize {
  fn should_retry(&self, _err: &RxError, attempt: usize) -> Option<Duration> {
    if attempt < *self { Some(Duration::ZERO) } else { None }
  }
}

/// A configuration struct for Retry.
///
/// Allows configuring:
/// - Maximum retry count (unbounded when unset)
/// - Delay between retries
/// - Whether to reset the retry count on successful emission
///
/// # Examples
///
/// ```rust
/// use rxflow::{ops::retry::RetryConfig, scheduler::Duration};
///
/// let config = RetryConfig::new()
///   .count(5)
///   .delay(Duration::from_secs(1))
///   .reset_on_success();
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryConfig {
  count: Option<usize>,
  delay: Option<Duration>,
  reset_on_success: bool,
}

impl RetryConfig {
  /// Creates a configuration that retries forever without delay.
  pub fn new() -> Self { Self::default() }

  /// Sets the maximum number of retry attempts.
  ///
  /// `count(3)` allows for 3 retries, resulting in a maximum of 4 total
  /// subscription attempts (1 initial + 3 retries).
  pub fn count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  /// Sets the delay duration between retries.
  ///
  /// The wait observes cancellation of the pulling task.
  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Enables resetting the retry count when a value is successfully emitted.
  ///
  /// This allows for indefinite retries as long as the source stays healthy
  /// for at least one emission between failures.
  pub fn reset_on_success(mut self) -> Self {
    self.reset_on_success = true;
    self
  }
}

impl RetryPolicy for RetryConfig {
  fn should_retry(&self, _err: &RxError, attempt: usize) -> Option<Duration> {
    if self.count.map_or(false, |count| attempt >= count) {
      return None;
    }
    Some(self.delay.unwrap_or(Duration::ZERO))
  }

  fn reset_on_success(&self) -> bool { self.reset_on_success }
}

/// The Retry operator struct.
pub struct Retry<S, P> {
  source: Arc<S>,
  policy: P,
}

impl<S, P> Retry<S, P> {
  pub(crate) fn new(source: S, policy: P) -> Self { Retry { source: Arc::new(source), policy } }
}

impl<S, P> Observable for Retry<S, P>
where
  S: Observable + 'static,
  P: RetryPolicy,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let source = self.source.clone();
    let policy = self.policy.clone();
    let mut upstream = source.subscribe();
    let mut attempt = 0;

    Subscription::new(std::iter::from_fn(move || loop {
      let err = match upstream.next()? {
        Ok(value) => {
          if policy.reset_on_success() {
            attempt = 0;
          }
          return Some(Ok(value));
        }
        Err(err) => err,
      };

      let Some(delay) = policy.should_retry(&err, attempt) else {
        debug!(attempt, error = %err, "retries exhausted");
        return Some(Err(err));
      };
      attempt += 1;
      debug!(attempt, error = %err, ?delay, "resubscribing after error");
      if !delay.is_zero() && !scheduler::sleep(delay) {
        return Some(Err(err));
      }
      upstream = source.subscribe();
    }))
  }
}
