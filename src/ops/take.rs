use crate::{observable::Observable, subscription::Subscription};

/// Emits only the first `count` values, then completes and releases the
/// upstream.
pub struct Take<S> {
  source: S,
  count: usize,
}

impl<S> Take<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { Take { source, count } }
}

impl<S: Observable> Observable for Take<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    if self.count == 0 {
      return Subscription::closed();
    }
    Subscription::new(self.source.subscribe().take(self.count))
  }
}
