use std::sync::Arc;

use super::Observable;
use crate::subscription::Subscription;

/// Creates an observable producing the given values in order.
///
/// Completes immediately after the last value. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxflow::prelude::*;
///
/// let values: Vec<_> = observable::of(vec![1, 2, 3]).subscribe().flatten().collect();
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
pub fn of<T>(values: Vec<T>) -> Of<T>
where
  T: Clone + Send + Sync + 'static,
{
  Of { values: values.into() }
}

/// Observable returned by [`of`].
#[derive(Clone)]
pub struct Of<T> {
  values: Arc<[T]>,
}

impl<T> Observable for Of<T>
where
  T: Clone + Send + Sync + 'static,
{
  type Item = T;

  fn subscribe(&self) -> Subscription<T> {
    let values = self.values.clone();
    Subscription::new((0..values.len()).map(move |i| Ok(values[i].clone())))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Result;

  #[test]
  fn every_subscription_replays() {
    let source = of(vec!["a", "b"]);
    for _ in 0..2 {
      let out: Vec<_> = source.subscribe().collect::<Result<_>>().unwrap();
      assert_eq!(out, vec!["a", "b"]);
    }
  }

  #[test]
  fn empty_of_completes() {
    let mut sub = of(Vec::<i32>::new()).subscribe();
    assert!(sub.next().is_none());
    assert!(sub.is_closed());
  }
}
