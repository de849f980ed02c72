use crate::{error::RxError, observable::Observable, subscription::Subscription};

/// Emits the value at a zero-based index, then completes.
///
/// If the source completes first, the default value is emitted instead, or the
/// run fails with [`RxError::OutOfRange`] when there is none.
pub struct ElementAt<S: Observable> {
  source: S,
  index: usize,
  default: Option<S::Item>,
}

impl<S: Observable> ElementAt<S> {
  pub(crate) fn new(source: S, index: usize, default: Option<S::Item>) -> Self {
    ElementAt { source, index, default }
  }
}

impl<S> Observable for ElementAt<S>
where
  S: Observable,
  S::Item: Clone + Sync,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut upstream = Some(self.source.subscribe());
    let index = self.index;
    let mut default = self.default.clone();
    Subscription::new(std::iter::from_fn(move || {
      for (i, item) in upstream.take()?.enumerate() {
        match item {
          Ok(v) if i == index => return Some(Ok(v)),
          Ok(_) => {}
          Err(err) => return Some(Err(err)),
        }
      }
      Some(default.take().ok_or(RxError::OutOfRange))
    }))
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn picks_index() {
    let out: Vec<_> =
      observable::from_iter(10..).element_at(2, None).subscribe().flatten().collect();
    assert_eq!(out, vec![12]);
  }

  #[test]
  fn falls_back_to_default() {
    let out: Vec<_> =
      observable::of(vec![1]).element_at(4, Some(-1)).subscribe().flatten().collect();
    assert_eq!(out, vec![-1]);
  }

  #[test]
  fn out_of_range_without_default() {
    let mut sub = observable::of(vec![1]).element_at(1, None).subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::OutOfRange))));
  }

  #[test]
  fn upstream_error_wins_over_default() {
    let mut sub = observable::throw_err(|| RxError::Timeout).element_at(3, Some(0)).subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::Timeout))));
  }
}
