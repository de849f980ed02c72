use std::ops::Range;

use crossbeam_channel::{select, Receiver};

use super::Observable;
use crate::{scheduler::CancelToken, subscription::Subscription};

/// Creates an observable that produces values from an iterator.
///
/// The iterator is cloned for every subscription, so each run starts from the
/// beginning. Completes when the iterator is exhausted. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxflow::prelude::*;
///
/// let evens: Vec<_> = observable::from_iter(0..10)
///   .filter(|v| v % 2 == 0)
///   .subscribe()
///   .flatten()
///   .collect();
/// assert_eq!(evens, vec![0, 2, 4, 6, 8]);
/// ```
pub fn from_iter<I>(iter: I) -> FromIter<I>
where
  I: IntoIterator + Clone + Send + Sync,
  I::IntoIter: Send + 'static,
  I::Item: Send + 'static,
{
  FromIter(iter)
}

/// Emits `count` consecutive integers starting at `start`.
pub fn range(start: i64, count: usize) -> FromIter<Range<i64>> {
  let end = i64::try_from(count).map_or(i64::MAX, |count| start.saturating_add(count));
  FromIter(start..end)
}

#[derive(Clone)]
pub struct FromIter<I>(I);

impl<I> Observable for FromIter<I>
where
  I: IntoIterator + Clone + Send + Sync,
  I::IntoIter: Send + 'static,
  I::Item: Send + 'static,
{
  type Item = I::Item;

  fn subscribe(&self) -> Subscription<I::Item> {
    Subscription::new(self.0.clone().into_iter().map(Ok))
  }
}

/// Creates an observable that drains a channel.
///
/// The receiver is shared, so concurrent subscriptions compete for messages,
/// each message going to exactly one of them. A run completes when every
/// sender has been dropped and the channel is empty. A pull blocked on an
/// empty channel is released when the pulling task is cancelled.
pub fn from_channel<T: Send + 'static>(rx: Receiver<T>) -> FromChannel<T> { FromChannel { rx } }

#[derive(Clone)]
pub struct FromChannel<T> {
  rx: Receiver<T>,
}

impl<T: Send + 'static> Observable for FromChannel<T> {
  type Item = T;

  fn subscribe(&self) -> Subscription<T> {
    let rx = self.rx.clone();
    Subscription::new(std::iter::from_fn(move || {
      let token = CancelToken::current();
      select! {
        recv(rx) -> msg => msg.ok().map(Ok),
        recv(token.cancelled()) -> _ => None,
      }
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Result;

  #[test]
  fn range_counts_from_start() {
    let out: Vec<_> = range(3, 4).subscribe().collect::<Result<_>>().unwrap();
    assert_eq!(out, vec![3, 4, 5, 6]);
    assert!(range(0, 0).subscribe().next().is_none());
  }

  #[test]
  fn range_saturates() {
    let out: Vec<_> = range(i64::MAX - 1, 5).subscribe().collect::<Result<_>>().unwrap();
    assert_eq!(out, vec![i64::MAX - 1]);
  }

  #[test]
  fn from_iter_restarts_per_subscription() {
    let source = from_iter(vec![1, 2]);
    let a: Vec<_> = source.subscribe().collect::<Result<_>>().unwrap();
    let b: Vec<_> = source.subscribe().collect::<Result<_>>().unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn from_channel_completes_when_senders_drop() {
    let (tx, rx) = crossbeam_channel::unbounded();
    for i in 0..3 {
      tx.send(i).unwrap();
    }
    drop(tx);
    let out: Vec<_> = from_channel(rx).subscribe().collect::<Result<_>>().unwrap();
    assert_eq!(out, vec![0, 1, 2]);
  }
}
