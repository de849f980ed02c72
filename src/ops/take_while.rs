use std::sync::Arc;

use crate::{observable::Observable, subscription::Subscription};

/// Emits values while the predicate holds, then completes and releases the
/// upstream. The first failing value is not emitted.
pub struct TakeWhile<S, F> {
  source: S,
  predicate: Arc<F>,
}

impl<S, F> TakeWhile<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self {
    TakeWhile { source, predicate: Arc::new(predicate) }
  }
}

impl<S, F> Observable for TakeWhile<S, F>
where
  S: Observable,
  F: Fn(&S::Item) -> bool + Send + Sync + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let predicate = self.predicate.clone();
    Subscription::new(
      self
        .source
        .subscribe()
        .take_while(move |item| item.as_ref().map_or(true, |v| predicate(v))),
    )
  }
}

/// Drops values while the predicate holds, then mirrors the source from the
/// first failing value on.
pub struct SkipWhile<S, F> {
  source: S,
  predicate: Arc<F>,
}

impl<S, F> SkipWhile<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self {
    SkipWhile { source, predicate: Arc::new(predicate) }
  }
}

impl<S, F> Observable for SkipWhile<S, F>
where
  S: Observable,
  F: Fn(&S::Item) -> bool + Send + Sync + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let predicate = self.predicate.clone();
    Subscription::new(
      self
        .source
        .subscribe()
        .skip_while(move |item| item.as_ref().map_or(false, |v| predicate(v))),
    )
  }
}
