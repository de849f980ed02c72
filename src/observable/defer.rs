use super::Observable;
use crate::subscription::Subscription;

/// Creates an observable that calls `factory` on every subscription and
/// subscribes to the observable it returns.
///
/// ```rust
/// # use rxflow::prelude::*;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let calls = AtomicUsize::new(0);
/// let source = observable::defer(move || {
///   let n = calls.fetch_add(1, Ordering::SeqCst);
///   observable::of(vec![n])
/// });
/// assert_eq!(source.subscribe().next().unwrap().unwrap(), 0);
/// assert_eq!(source.subscribe().next().unwrap().unwrap(), 1);
/// ```
pub fn defer<F, O>(factory: F) -> Defer<F>
where
  F: Fn() -> O + Send + Sync,
  O: Observable,
{
  Defer(factory)
}

#[derive(Clone)]
pub struct Defer<F>(F);

impl<F, O> Observable for Defer<F>
where
  F: Fn() -> O + Send + Sync,
  O: Observable,
{
  type Item = O::Item;

  fn subscribe(&self) -> Subscription<O::Item> { (self.0)().subscribe() }
}
