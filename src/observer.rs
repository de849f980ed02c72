//! Observer trait and implementations
//!
//! The push view of a sequence. A [`Subscription`](crate::subscription::Subscription)
//! is driven into an observer by pulling in a loop: `next` for each value,
//! then exactly one of `error` or `complete`.

use std::ops::ControlFlow;

use crate::error::RxError;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
pub trait Observer<Item> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle the terminal error of the run
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: RxError);

  /// Handle completion of the run
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Checks if the observer is closed.
  ///
  /// The push driver consults this before every pull; returning `true` is the
  /// observer's "stop" signal and ends the run early.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Closure adapter that only observes values.
///
/// Errors and completion are ignored.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item> Observer<Item> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, _err: RxError) {}

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Closure adapter for all three callbacks.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  pub next: N,
  pub error: E,
  pub complete: C,
}

impl<Item, N, E, C> Observer<Item> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(RxError),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(self, err: RxError) { (self.error)(err); }

  #[inline]
  fn complete(self) { (self.complete)(); }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Closure adapter whose value callback can request an early stop.
pub struct UntilObserver<F> {
  next: F,
  stopped: bool,
}

impl<F> UntilObserver<F> {
  pub fn new(next: F) -> Self { UntilObserver { next, stopped: false } }
}

impl<Item, F> Observer<Item> for UntilObserver<F>
where
  F: FnMut(Item) -> ControlFlow<()>,
{
  fn next(&mut self, value: Item) {
    if (self.next)(value).is_break() {
      self.stopped = true;
    }
  }

  fn error(self, _err: RxError) {}

  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { self.stopped }
}

// ============================================================================
// Option observer
// ============================================================================

/// Option observer - None ignores all events, Some delegates to inner
impl<O, Item> Observer<Item> for Option<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: RxError) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Observer::is_closed) }
}

// ============================================================================
// Tests
// ============================================================================
