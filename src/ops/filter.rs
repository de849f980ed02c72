use std::sync::Arc;

use crate::{observable::Observable, subscription::Subscription};

/// Emits only the values for which the predicate returns `true`.
///
/// Errors always pass through.
pub struct Filter<S, F> {
  source: S,
  predicate: Arc<F>,
}

impl<S, F> Filter<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self {
    Filter { source, predicate: Arc::new(predicate) }
  }
}

impl<S, F> Observable for Filter<S, F>
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
        .filter(move |item| item.as_ref().map_or(true, |v| predicate(v))),
    )
  }
}
