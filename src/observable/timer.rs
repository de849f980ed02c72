use super::Observable;
use crate::{
  scheduler::{self, Duration, Instant},
  subscription::Subscription,
};

/// Returns an observable that emits `0` once, `duration` after the first pull,
/// then completes.
///
/// The wait observes the current task's cancellation token; a cancelled wait
/// completes the run without a value.
pub fn timer(duration: Duration) -> Timer { Timer { due: Due::After(duration) } }

/// Like [`timer`], but fires at the instant `at`. An instant in the past fires
/// immediately.
pub fn timer_at(at: Instant) -> Timer { Timer { due: Due::At(at) } }

#[derive(Clone, Copy, Debug)]
enum Due {
  After(Duration),
  At(Instant),
}

impl Due {
  fn remaining(self) -> Duration {
    match self {
      Due::After(duration) => duration,
      Due::At(at) => at.saturating_duration_since(Instant::now()),
    }
  }
}

#[derive(Clone, Copy, Debug)]
pub struct Timer {
  due: Due,
}

impl Observable for Timer {
  type Item = u64;

  fn subscribe(&self) -> Subscription<u64> {
    let due = self.due;
    let mut fired = false;
    Subscription::new(std::iter::from_fn(move || {
      if fired || !scheduler::sleep(due.remaining()) {
        return None;
      }
      fired = true;
      Some(Ok(0))
    }))
  }
}

/// Returns an observable that emits `0, 1, 2, ...`, one value per `period`.
///
/// Each value is produced `period` after the pull that requested it. The run
/// never completes on its own; drop the subscription or cancel the pulling
/// task to stop it.
pub fn interval(period: Duration) -> Interval { Interval { period } }

#[derive(Clone, Copy, Debug)]
pub struct Interval {
  period: Duration,
}

impl Observable for Interval {
  type Item = u64;

  fn subscribe(&self) -> Subscription<u64> {
    let period = self.period;
    let mut ticks = 0u64..;
    Subscription::new(std::iter::from_fn(move || {
      if !scheduler::sleep(period) {
        return None;
      }
      ticks.next().map(Ok)
    }))
  }
}
