use std::sync::Arc;

use crate::{observable::Observable, subscription::Subscription};

/// Calls a side-effect function with a reference to every value, passing the
/// value through unchanged.
pub struct Tap<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> Tap<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { Tap { source, func: Arc::new(func) } }
}

impl<S, F> Observable for Tap<S, F>
where
  S: Observable,
  F: Fn(&S::Item) + Send + Sync + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let func = self.func.clone();
    Subscription::new(self.source.subscribe().inspect(move |item| {
      if let Ok(v) = item {
        func(v);
      }
    }))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  #[test]
  fn sees_values_in_order() {
    let seen = Arc::new(Mutex::new(vec![]));
    let log = seen.clone();
    let out: Vec<_> = observable::of(vec![1, 2, 3])
      .tap(move |v| log.lock().unwrap().push(*v))
      .subscribe()
      .flatten()
      .collect();
    assert_eq!(out, vec![1, 2, 3]);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
  }
}
