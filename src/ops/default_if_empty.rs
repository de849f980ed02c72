use crate::{observable::Observable, subscription::Subscription};

/// Emits a default value if the source completes without emitting anything.
pub struct DefaultIfEmpty<S: Observable> {
  source: S,
  default: S::Item,
}

impl<S: Observable> DefaultIfEmpty<S> {
  pub(crate) fn new(source: S, default: S::Item) -> Self { DefaultIfEmpty { source, default } }
}

impl<S> Observable for DefaultIfEmpty<S>
where
  S: Observable,
  S::Item: Clone + Sync,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut upstream = self.source.subscribe();
    let mut default = Some(self.default.clone());
    Subscription::new(std::iter::from_fn(move || match upstream.next() {
      Some(item) => {
        default = None;
        Some(item)
      }
      None => default.take().map(Ok),
    }))
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn base_function() {
    let out: Vec<_> =
      observable::of(vec![1, 2]).default_if_empty(5).subscribe().flatten().collect();
    assert_eq!(out, vec![1, 2]);
  }

  #[test]
  fn base_empty_function() {
    let out: Vec<_> = observable::empty().default_if_empty(5).subscribe().flatten().collect();
    assert_eq!(out, vec![5]);
  }

  #[test]
  fn error_is_not_replaced() {
    let mut sub = observable::throw_err(|| RxError::Timeout).default_if_empty(5).subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::Timeout))));
    assert!(sub.next().is_none());
  }
}
