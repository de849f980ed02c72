use std::sync::Arc;

use crate::{observable::Observable, subscription::Subscription};

/// Folds the whole source with `func` and emits the final result once the
/// source completes.
///
/// An empty source emits `initial`. An error terminates the run without a
/// result.
pub struct Reduce<S, F, A> {
  source: S,
  func: Arc<F>,
  initial: A,
}

impl<S, F, A> Reduce<S, F, A> {
  pub(crate) fn new(source: S, initial: A, func: F) -> Self {
    Reduce { source, func: Arc::new(func), initial }
  }
}

impl<S, F, A> Observable for Reduce<S, F, A>
where
  S: Observable,
  F: Fn(A, S::Item) -> A + Send + Sync + 'static,
  A: Clone + Send + Sync + 'static,
{
  type Item = A;

  fn subscribe(&self) -> Subscription<A> {
    let func = self.func.clone();
    let initial = self.initial.clone();
    let mut upstream = Some(self.source.subscribe());
    Subscription::new(std::iter::from_fn(move || {
      let upstream = upstream.take()?;
      let mut acc = initial.clone();
      for item in upstream {
        match item {
          Ok(v) => acc = func(acc, v),
          Err(err) => return Some(Err(err)),
        }
      }
      Some(Ok(acc))
    }))
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn folds_to_one_value() {
    let out: Vec<_> = observable::range(1, 4)
      .reduce(0, |acc, v| acc + v)
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![10]);
  }

  #[test]
  fn empty_source_emits_the_seed() {
    let out: Vec<_> =
      observable::empty::<i32>().reduce(7, |acc, v| acc * v).subscribe().flatten().collect();
    assert_eq!(out, vec![7]);
  }

  #[test]
  fn error_replaces_the_result() {
    let mut sub = observable::of(vec![1, 2])
      .concat_with(observable::throw_err(|| RxError::NotFound))
      .reduce(0, |acc, v| acc + v)
      .subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::NotFound))));
    assert!(sub.next().is_none());
  }
}
