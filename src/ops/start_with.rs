use crate::{observable::Observable, subscription::Subscription};

/// Emits the given values before those of the source.
pub struct StartWith<S: Observable> {
  source: S,
  values: Vec<S::Item>,
}

impl<S: Observable> StartWith<S> {
  pub(crate) fn new(source: S, values: Vec<S::Item>) -> Self { StartWith { source, values } }
}

impl<S> Observable for StartWith<S>
where
  S: Observable,
  S::Item: Clone + Sync,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let head = self.values.clone().into_iter().map(Ok);
    Subscription::new(head.chain(self.source.subscribe()))
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn simple_integer() {
    let out: Vec<_> = observable::of(vec![3, 4])
      .start_with(vec![1, 2])
      .subscribe()
      .flatten()
      .collect();
    assert_eq!(out, vec![1, 2, 3, 4]);
  }

  #[test]
  fn prefix_on_empty_source() {
    let out: Vec<_> = observable::empty().start_with(vec![0]).subscribe().flatten().collect();
    assert_eq!(out, vec![0]);
  }
}
