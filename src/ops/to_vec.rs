use crate::{observable::Observable, subscription::Subscription};

/// Collects every value into one `Vec`, emitted when the source completes.
///
/// An empty source yields an empty `Vec`.
pub struct ToVec<S> {
  source: S,
}

impl<S> ToVec<S> {
  pub(crate) fn new(source: S) -> Self { ToVec { source } }
}

impl<S: Observable> Observable for ToVec<S> {
  type Item = Vec<S::Item>;

  fn subscribe(&self) -> Subscription<Vec<S::Item>> {
    let mut upstream = Some(self.source.subscribe());
    Subscription::new(std::iter::from_fn(move || Some(upstream.take()?.collect())))
  }
}
