use std::{collections::HashSet, hash::Hash, sync::Arc};

use crate::{observable::Observable, subscription::Subscription};

/// Emits only values whose key has not been seen earlier in the run.
///
/// The set of seen keys lives in the subscription and grows for as long as the
/// run lasts.
pub struct Distinct<S, F> {
  source: S,
  key: Arc<F>,
}

impl<S, F> Distinct<S, F> {
  pub(crate) fn new(source: S, key: F) -> Self { Distinct { source, key: Arc::new(key) } }
}

impl<S, F, K> Observable for Distinct<S, F>
where
  S: Observable,
  F: Fn(&S::Item) -> K + Send + Sync + 'static,
  K: Eq + Hash + Send + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let key = self.key.clone();
    let mut seen = HashSet::new();
    Subscription::new(
      self
        .source
        .subscribe()
        .filter(move |item| item.as_ref().map_or(true, |v| seen.insert(key(v)))),
    )
  }
}

/// Emits a value only when it differs from the previous one.
pub struct DistinctUntilChanged<S> {
  source: S,
}

impl<S> DistinctUntilChanged<S> {
  pub(crate) fn new(source: S) -> Self { DistinctUntilChanged { source } }
}

impl<S> Observable for DistinctUntilChanged<S>
where
  S: Observable,
  S::Item: PartialEq + Clone,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut last: Option<S::Item> = None;
    Subscription::new(self.source.subscribe().filter(move |item| match item {
      Ok(v) if last.as_ref() == Some(v) => false,
      Ok(v) => {
        last = Some(v.clone());
        true
      }
      Err(_) => true,
    }))
  }
}
