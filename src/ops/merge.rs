use tracing::debug;

use super::join::{assert_arity, forward, Emission, FanIn};
use crate::{error::Result, observable::Observable, subscription::Subscription};

/// Combines several observables into one by merging their emissions.
///
/// Every source is pulled concurrently by its own task. Values come out in
/// arrival order, and values of one source keep their relative order. The run
/// completes once every source has completed. The first error cancels the
/// other sources and terminates the run.
///
/// # Panics
///
/// If fewer than two sources are given.
///
/// # Example
///
/// ```
/// use rxflow::prelude::*;
///
/// let mut values: Vec<_> = observable::merge(vec![
///   observable::of(vec![1, 2]),
///   observable::of(vec![3, 4]),
/// ])
/// .subscribe()
/// .flatten()
/// .collect();
/// values.sort();
/// assert_eq!(values, vec![1, 2, 3, 4]);
/// ```
pub fn merge<S: Observable>(sources: Vec<S>) -> Merge<S> {
  assert_arity("merge", sources.len());
  Merge { sources }
}

pub struct Merge<S> {
  sources: Vec<S>,
}

impl<S: Observable> Observable for Merge<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    Subscription::new(MergeCursor {
      pending: Some(self.sources.iter().map(Observable::subscribe).collect()),
      fan: None,
      total: self.sources.len(),
      completed: 0,
    })
  }
}

struct MergeCursor<T> {
  pending: Option<Vec<Subscription<T>>>,
  fan: Option<FanIn<Emission<T>>>,
  total: usize,
  completed: usize,
}

impl<T: Send + 'static> MergeCursor<T> {
  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }
}

impl<T: Send + 'static> Iterator for MergeCursor<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Result<T>> {
    if let Some(sources) = self.pending.take() {
      match FanIn::start("merge", sources, forward) {
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
        Emission::Next(_, v) => return Some(Ok(v)),
        Emission::Error(index, err) => {
          debug!(source = index, error = %err, "merge source failed");
          self.finish();
          return Some(Err(err));
        }
        Emission::Complete(_) => {
          self.completed += 1;
          if self.completed == self.total {
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

  #[test]
  fn odd_even_merge() {
    let even = observable::from_iter((0..10).filter(|v| v % 2 == 0).collect::<Vec<_>>());
    let odd = observable::from_iter((0..10).filter(|v| v % 2 == 1).collect::<Vec<_>>());
    let mut all: Vec<_> = observable::merge(vec![even, odd]).subscribe().flatten().collect();
    all.sort();
    assert_eq!(all, (0..10).collect::<Vec<_>>());
  }

  #[test]
  fn completed_test() {
    let mut completed = false;
    let mut count = 0;
    observable::of(vec![1]).merge_with(observable::of(vec![2])).subscribe_all(
      |_| count += 1,
      |_| unreachable!(),
      || completed = true,
    );
    assert_eq!(count, 2);
    assert!(completed);
  }

  #[test]
  fn error_test() {
    let mut sub = observable::never::<i32>()
      .merge_with(observable::throw_err(|| RxError::msg("boom")))
      .subscribe();
    let first = sub.next();
    assert!(matches!(first, Some(Err(ref e)) if e.to_string() == "boom"));
    assert!(sub.next().is_none());
  }

  #[test]
  fn merge_unsubscribe_work() {
    let mut sub = observable::interval(Duration::from_millis(1))
      .merge_with(observable::never())
      .subscribe();
    assert!(matches!(sub.next(), Some(Ok(0))));
    let start = Instant::now();
    sub.unsubscribe();
    assert!(sub.is_closed());
    assert!(start.elapsed() < Duration::from_secs(5));
  }

  #[test]
  #[should_panic(expected = "merge requires at least 2 sources")]
  fn single_source_panics() { let _ = observable::merge(vec![observable::of(vec![1])]); }
}
