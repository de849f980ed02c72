use crate::{observable::Observable, subscription::Subscription};

/// Groups values into batches of `count`.
///
/// The final, possibly shorter, batch is emitted when the source completes. A
/// `count` of zero is treated as one.
pub struct BufferCount<S> {
  source: S,
  count: usize,
}

impl<S> BufferCount<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { BufferCount { source, count: count.max(1) } }
}

impl<S: Observable> Observable for BufferCount<S> {
  type Item = Vec<S::Item>;

  fn subscribe(&self) -> Subscription<Vec<S::Item>> {
    let mut upstream = self.source.subscribe();
    let count = self.count;
    Subscription::new(std::iter::from_fn(move || {
      let mut batch = Vec::with_capacity(count);
      while batch.len() < count {
        match upstream.next() {
          Some(Ok(v)) => batch.push(v),
          Some(Err(err)) => return Some(Err(err)),
          None => break,
        }
      }
      (!batch.is_empty()).then_some(Ok(batch))
    }))
  }
}
