use futures::{executor::block_on_stream, Stream};

use super::Observable;
use crate::subscription::Subscription;

/// Creates an observable from a factory of `futures` streams.
///
/// Each subscription builds a fresh stream and drives it on the pulling
/// thread with a blocking executor, one item per pull.
///
/// A pull waiting on a pending stream is not interrupted by cancellation; the
/// stream must make progress on its own for the run to notice it.
pub fn from_stream<F, St>(factory: F) -> FromStream<F>
where
  F: Fn() -> St + Send + Sync,
  St: Stream + Send + 'static,
  St::Item: Send + 'static,
{
  FromStream(factory)
}

#[derive(Clone)]
pub struct FromStream<F>(F);

impl<F, St> Observable for FromStream<F>
where
  F: Fn() -> St + Send + Sync,
  St: Stream + Send + 'static,
  St::Item: Send + 'static,
{
  type Item = St::Item;

  fn subscribe(&self) -> Subscription<St::Item> {
    let stream = Box::pin((self.0)());
    Subscription::new(block_on_stream(stream).map(Ok))
  }
}

#[cfg(test)]
mod tests {
  use futures::stream;

  use super::*;
  use crate::error::Result;

  #[test]
  fn drains_the_stream() {
    let source = from_stream(|| stream::iter(vec![1, 2, 3]));
    let out: Vec<_> = source.subscribe().collect::<Result<_>>().unwrap();
    assert_eq!(out, vec![1, 2, 3]);
  }

  #[test]
  fn each_subscription_builds_a_new_stream() {
    let source = from_stream(|| stream::once(async { "hi" }));
    assert_eq!(source.subscribe().count(), 1);
    assert_eq!(source.subscribe().count(), 1);
  }
}
