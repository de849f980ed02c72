use super::join::{assert_arity, forward, Emission, FanIn};
use crate::{error::Result, observable::Observable, subscription::Subscription};

/// Emits a snapshot of the latest value of every source.
///
/// Nothing is emitted until each source has produced at least one value; from
/// then on, every new value from any source emits a fresh snapshot in source
/// order. The run completes once every source has completed, and the first
/// error cancels the other sources.
///
/// # Panics
///
/// If fewer than two sources are given.
pub fn combine_latest<S>(sources: Vec<S>) -> CombineLatest<S>
where
  S: Observable,
  S::Item: Clone,
{
  assert_arity("combine_latest", sources.len());
  CombineLatest { sources }
}

pub struct CombineLatest<S> {
  sources: Vec<S>,
}

impl<S> Observable for CombineLatest<S>
where
  S: Observable,
  S::Item: Clone,
{
  type Item = Vec<S::Item>;

  fn subscribe(&self) -> Subscription<Vec<S::Item>> {
    let total = self.sources.len();
    Subscription::new(CombineLatestCursor {
      pending: Some(self.sources.iter().map(Observable::subscribe).collect()),
      fan: None,
      latest: (0..total).map(|_| None).collect(),
      seen: 0,
      completed: 0,
    })
  }
}

struct CombineLatestCursor<T> {
  pending: Option<Vec<Subscription<T>>>,
  fan: Option<FanIn<Emission<T>>>,
  latest: Vec<Option<T>>,
  // Number of sources with a value in `latest`.
  seen: usize,
  completed: usize,
}

impl<T: Clone + Send + 'static> CombineLatestCursor<T> {
  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }

  fn snapshot(&self) -> Vec<T> { self.latest.iter().flatten().cloned().collect() }
}

impl<T: Clone + Send + 'static> Iterator for CombineLatestCursor<T> {
  type Item = Result<Vec<T>>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(sources) = self.pending.take() {
      match FanIn::start("combine_latest", sources, forward) {
        Ok(fan) => self.fan = Some(fan),
        Err(err) => return Some(Err(err)),
      }
    }

    loop {
      let Some(emission) = self.fan.as_ref()?.recv() else {
        self.finish();
        return None;
      };
      match emission {
        Emission::Next(index, v) => {
          if self.latest[index].replace(v).is_none() {
            self.seen += 1;
          }
          if self.seen == self.latest.len() {
            return Some(Ok(self.snapshot()));
          }
        }
        Emission::Error(_, err) => {
          self.finish();
          return Some(Err(err));
        }
        Emission::Complete(_) => {
          self.completed += 1;
          if self.completed == self.latest.len() {
            self.finish();
            return None;
          }
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  fn delayed(value: i32, millis: u64) -> BoxedObservable<i32> {
    observable::of(vec![value])
      .delay(Duration::from_millis(millis))
      .start_with(vec![0])
      .box_it()
  }

  #[test]
  fn snapshots_follow_arrivals() {
    let snapshots: Vec<_> =
      observable::combine_latest(vec![delayed(1, 50), delayed(5, 150), delayed(10, 250)])
        .subscribe()
        .collect::<crate::error::Result<_>>()
        .unwrap();
    assert_eq!(
      snapshots,
      vec![vec![0, 0, 0], vec![1, 0, 0], vec![1, 5, 0], vec![1, 5, 10]]
    );
  }

  #[test]
  fn silent_until_every_source_emitted() {
    let out: Vec<_> = observable::combine_latest(vec![
      observable::of(vec![1, 2, 3]).box_it(),
      observable::empty().box_it(),
    ])
    .subscribe()
    .collect();
    assert!(out.is_empty());
  }

  #[test]
  fn error_terminates() {
    let mut sub = observable::combine_latest(vec![
      observable::never::<i32>().box_it(),
      observable::throw_err(|| RxError::Timeout).box_it(),
    ])
    .subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::Timeout))));
    assert!(sub.next().is_none());
  }

  #[test]
  fn combine_latest_with_builds_tuples() {
    let out: Vec<_> = observable::of(vec![1])
      .combine_latest_with(observable::of(vec!["a"]))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![(1, "a")]);
  }
}
