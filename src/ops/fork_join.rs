use crossbeam_channel::Sender;

use super::join::{assert_arity, hand_off, FanIn};
use crate::{
  error::{Result, RxError},
  observable::Observable,
  scheduler::CancelToken,
  subscription::Subscription,
};

/// Waits for every source to complete, then emits one `Vec` holding the last
/// value of each source, in source order.
///
/// Sources run concurrently to exhaustion. If any source completes without
/// emitting a value, the whole operation completes silently with no emission.
/// The first error aborts every source and terminates the run.
///
/// # Panics
///
/// If fewer than two sources are given.
pub fn fork_join<S: Observable>(sources: Vec<S>) -> ForkJoin<S> {
  assert_arity("fork_join", sources.len());
  ForkJoin { sources }
}

pub struct ForkJoin<S> {
  sources: Vec<S>,
}

impl<S: Observable> Observable for ForkJoin<S> {
  type Item = Vec<S::Item>;

  fn subscribe(&self) -> Subscription<Vec<S::Item>> {
    let total = self.sources.len();
    Subscription::new(ForkJoinCursor {
      pending: Some(self.sources.iter().map(Observable::subscribe).collect()),
      fan: None,
      results: (0..total).map(|_| None).collect(),
      settled: 0,
    })
  }
}

/// Final state of one source.
enum Outcome<T> {
  Last(usize, T),
  Empty,
  Failed(RxError),
}

fn exhaust<T>(index: usize, upstream: Subscription<T>, tx: Sender<Outcome<T>>, token: CancelToken) {
  let mut last = None;
  for item in upstream {
    if token.is_cancelled() {
      return;
    }
    match item {
      Ok(v) => last = Some(v),
      Err(err) => {
        hand_off(&tx, Outcome::Failed(err), &token);
        return;
      }
    }
  }
  let outcome = match last {
    Some(v) => Outcome::Last(index, v),
    None => Outcome::Empty,
  };
  hand_off(&tx, outcome, &token);
}

struct ForkJoinCursor<T> {
  pending: Option<Vec<Subscription<T>>>,
  fan: Option<FanIn<Outcome<T>>>,
  results: Vec<Option<T>>,
  settled: usize,
}

impl<T: Send + 'static> ForkJoinCursor<T> {
  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }
}

impl<T: Send + 'static> Iterator for ForkJoinCursor<T> {
  type Item = Result<Vec<T>>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(sources) = self.pending.take() {
      match FanIn::start("fork_join", sources, exhaust) {
        Ok(fan) => self.fan = Some(fan),
        Err(err) => return Some(Err(err)),
      }
    }

    loop {
      let outcome = self.fan.as_ref()?.recv();
      match outcome {
        Some(Outcome::Last(index, v)) => {
          self.results[index] = Some(v);
          self.settled += 1;
          if self.settled == self.results.len() {
            self.finish();
            let results = std::mem::take(&mut self.results);
            return Some(Ok(results.into_iter().flatten().collect()));
          }
        }
        Some(Outcome::Failed(err)) => {
          self.finish();
          return Some(Err(err));
        }
        Some(Outcome::Empty) | None => {
          self.finish();
          return None;
        }
      }
    }
  }
}
