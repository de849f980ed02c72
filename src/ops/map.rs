use std::sync::Arc;

use crate::{error::Result, observable::Observable, subscription::Subscription};

/// Projects every value through a function.
pub struct Map<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> Map<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { Map { source, func: Arc::new(func) } }
}

impl<S, F, O> Observable for Map<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> O + Send + Sync + 'static,
  O: Send + 'static,
{
  type Item = O;

  fn subscribe(&self) -> Subscription<O> {
    let func = self.func.clone();
    Subscription::new(self.source.subscribe().map(move |item| item.map(|v| func(v))))
  }
}

/// Projects every value through a fallible function.
///
/// The first `Err` returned by the projection becomes the terminal error of
/// the run and releases the upstream.
pub struct TryMap<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> TryMap<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TryMap { source, func: Arc::new(func) } }
}

impl<S, F, O> Observable for TryMap<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> Result<O> + Send + Sync + 'static,
  O: Send + 'static,
{
  type Item = O;

  fn subscribe(&self) -> Subscription<O> {
    let func = self.func.clone();
    Subscription::new(self.source.subscribe().map(move |item| item.and_then(|v| func(v))))
  }
}
