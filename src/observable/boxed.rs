//! Type-erased observables.
//!
//! Join operators take their sources as one `Vec<S>`, so sources of different
//! concrete types have to be erased to a common [`BoxedObservable`] first.

use std::{fmt, sync::Arc};

use super::Observable;
use crate::subscription::Subscription;

/// A shareable, type-erased observable.
///
/// Cloning is cheap and every clone subscribes to the same blueprint.
pub struct BoxedObservable<T>(Arc<dyn Observable<Item = T>>);

impl<T: Send + 'static> BoxedObservable<T> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = T> + 'static,
  {
    BoxedObservable(Arc::new(source))
  }
}

impl<T> Clone for BoxedObservable<T> {
  fn clone(&self) -> Self { BoxedObservable(self.0.clone()) }
}

impl<T: Send + 'static> Observable for BoxedObservable<T> {
  type Item = T;

  #[inline]
  fn subscribe(&self) -> Subscription<T> { self.0.subscribe() }
}

impl<T> fmt::Debug for BoxedObservable<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("BoxedObservable") }
}
