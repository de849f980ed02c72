use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crossbeam_channel::Sender;
use tracing::debug;

use super::join::{assert_arity, hand_off, FanIn};
use crate::{
  error::Result, observable::Observable, scheduler::CancelToken, subscription::Subscription,
};

const UNCLAIMED: usize = usize::MAX;

/// Mirrors the first source to produce a value or an error.
///
/// All sources are subscribed concurrently. The first one whose first event is
/// a value or an error claims the race with a single atomic exchange; its
/// events, including an immediate error, are forwarded verbatim and the other
/// sources are cancelled. A source that completes without emitting does not
/// claim, and if every source does so the run completes empty.
///
/// # Panics
///
/// If fewer than two sources are given.
pub fn race<S: Observable>(sources: Vec<S>) -> Race<S> {
  assert_arity("race", sources.len());
  Race { sources }
}

pub struct Race<S> {
  sources: Vec<S>,
}

impl<S: Observable> Observable for Race<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    Subscription::new(RaceCursor {
      pending: Some(self.sources.iter().map(Observable::subscribe).collect()),
      fan: None,
      winner: None,
    })
  }
}

/// An event of the winning source; `None` marks its completion.
type Lap<T> = (usize, Option<Result<T>>);

fn run_lap<T>(
  claim: &AtomicUsize,
  index: usize,
  mut upstream: Subscription<T>,
  tx: Sender<Lap<T>>,
  token: CancelToken,
) {
  let Some(first) = upstream.next() else { return };
  if claim.compare_exchange(UNCLAIMED, index, Ordering::AcqRel, Ordering::Acquire).is_err() {
    return;
  }
  let mut event = Some(first);
  loop {
    let terminal = !matches!(event, Some(Ok(_)));
    if !hand_off(&tx, (index, event), &token) || terminal {
      return;
    }
    event = upstream.next();
  }
}

struct RaceCursor<T> {
  pending: Option<Vec<Subscription<T>>>,
  fan: Option<FanIn<Lap<T>>>,
  winner: Option<usize>,
}

impl<T: Send + 'static> RaceCursor<T> {
  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }
}

impl<T: Send + 'static> Iterator for RaceCursor<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Result<T>> {
    if let Some(sources) = self.pending.take() {
      let claim = Arc::new(AtomicUsize::new(UNCLAIMED));
      let started = FanIn::start("race", sources, move |index, upstream, tx, token| {
        run_lap(&claim, index, upstream, tx, token)
      });
      match started {
        Ok(fan) => self.fan = Some(fan),
        Err(err) => return Some(Err(err)),
      }
    }

    let fan = self.fan.as_ref()?;
    let Some((index, event)) = fan.recv() else {
      self.finish();
      return None;
    };
    if self.winner.is_none() {
      debug!(winner = index, "race claimed");
      self.winner = Some(index);
      fan.scope().cancel_others(index);
    }
    match event {
      Some(Ok(v)) => Some(Ok(v)),
      terminal => {
        self.finish();
        terminal
      }
    }
  }
}
