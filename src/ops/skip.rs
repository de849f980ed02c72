use crate::{observable::Observable, subscription::Subscription};

/// Ignores the first `count` values.
pub struct Skip<S> {
  source: S,
  count: usize,
}

impl<S> Skip<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { Skip { source, count } }
}

impl<S: Observable> Observable for Skip<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut remaining = self.count;
    Subscription::new(self.source.subscribe().filter(move |item| {
      if remaining > 0 && item.is_ok() {
        remaining -= 1;
        return false;
      }
      true
    }))
  }
}
