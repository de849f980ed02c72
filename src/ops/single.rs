use std::sync::Arc;

use crate::{error::RxError, observable::Observable, subscription::Subscription};

/// Emits the only value matching the predicate once the source completes.
///
/// The predicate receives each value and its index. The run fails with
///
/// - [`RxError::Sequence`] as soon as a second value matches,
/// - [`RxError::NotFound`] if values arrived but none matched,
/// - [`RxError::Empty`] if the source was empty.
pub struct Single<S, F> {
  source: S,
  predicate: Arc<F>,
}

impl<S, F> Single<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self {
    Single { source, predicate: Arc::new(predicate) }
  }
}

impl<S, F> Observable for Single<S, F>
where
  S: Observable,
  F: Fn(&S::Item, usize) -> bool + Send + Sync + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut upstream = Some(self.source.subscribe());
    let predicate = self.predicate.clone();
    Subscription::new(std::iter::from_fn(move || {
      let mut seen = 0;
      let mut matched = None;
      for item in upstream.take()? {
        let v = match item {
          Ok(v) => v,
          Err(err) => return Some(Err(err)),
        };
        if predicate(&v, seen) {
          if matched.is_some() {
            return Some(Err(RxError::Sequence));
          }
          matched = Some(v);
        }
        seen += 1;
      }
      Some(match matched {
        Some(v) => Ok(v),
        None if seen > 0 => Err(RxError::NotFound),
        None => Err(RxError::Empty),
      })
    }))
  }
}

/// Emits the first value matching the predicate and completes.
///
/// Fails with [`RxError::NotFound`] if the source completes without a match.
pub struct Find<S, F> {
  source: S,
  predicate: Arc<F>,
}

impl<S, F> Find<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self {
    Find { source, predicate: Arc::new(predicate) }
  }
}

impl<S, F> Observable for Find<S, F>
where
  S: Observable,
  F: Fn(&S::Item, usize) -> bool + Send + Sync + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut upstream = Some(self.source.subscribe());
    let predicate = self.predicate.clone();
    Subscription::new(std::iter::from_fn(move || {
      for (i, item) in upstream.take()?.enumerate() {
        match item {
          Ok(v) if predicate(&v, i) => return Some(Ok(v)),
          Ok(_) => {}
          Err(err) => return Some(Err(err)),
        }
      }
      Some(Err(RxError::NotFound))
    }))
  }
}
