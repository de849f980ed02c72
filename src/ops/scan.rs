use std::sync::Arc;

use crate::{observable::Observable, subscription::Subscription};

/// Emits every intermediate result of folding the source with `func`,
/// starting from `initial`.
///
/// Every run starts over from a clone of `initial`.
pub struct Scan<S, F, A> {
  source: S,
  func: Arc<F>,
  initial: A,
}

impl<S, F, A> Scan<S, F, A> {
  pub(crate) fn new(source: S, initial: A, func: F) -> Self {
    Scan { source, func: Arc::new(func), initial }
  }
}

impl<S, F, A> Observable for Scan<S, F, A>
where
  S: Observable,
  F: Fn(A, S::Item) -> A + Send + Sync + 'static,
  A: Clone + Send + Sync + 'static,
{
  type Item = A;

  fn subscribe(&self) -> Subscription<A> {
    let func = self.func.clone();
    let mut acc = self.initial.clone();
    Subscription::new(self.source.subscribe().map(move |item| {
      acc = func(acc.clone(), item?);
      Ok(acc.clone())
    }))
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn emits_every_step() {
    let out: Vec<_> = observable::from_iter(vec![1, 1, 1, 1, 1])
      .scan(100, |acc, v| acc + v)
      .subscribe()
      .flatten()
      .collect();
    assert_eq!(out, vec![101, 102, 103, 104, 105]);
  }

  #[test]
  fn accumulator_may_change_type() {
    let out: Vec<_> = observable::of(vec!["a", "b", "c"])
      .scan(String::new(), |mut acc, v| {
        acc.push_str(v);
        acc
      })
      .subscribe()
      .flatten()
      .collect();
    assert_eq!(out, vec!["a", "ab", "abc"]);
  }

  #[test]
  fn each_run_starts_from_the_seed() {
    let sums = observable::of(vec![1, 2]).scan(0, |acc, v| acc + v);
    let first: Vec<_> = sums.subscribe().flatten().collect();
    let second: Vec<_> = sums.subscribe().flatten().collect();
    assert_eq!(first, second);
  }

  #[test]
  fn error_passes_through() {
    let mut sub = observable::of(vec![1])
      .concat_with(observable::throw_err(|| RxError::Timeout))
      .scan(0, |acc, v| acc + v)
      .subscribe();
    assert!(matches!(sub.next(), Some(Ok(1))));
    assert!(matches!(sub.next(), Some(Err(RxError::Timeout))));
    assert!(sub.next().is_none());
  }
}
