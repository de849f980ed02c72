use crossbeam_channel::select;
use tracing::debug;

use crate::{
  error::{Result, RxError},
  observable::Observable,
  scheduler::{CancelToken, Duration, TaskScope},
  subscription::Subscription,
};

/// Fails with [`RxError::Timeout`] when the first event of the source takes
/// longer than `duration`.
///
/// The first pull runs on a helper task and races a deadline. Once the first
/// value has arrived, later events pass through untimed on the consumer's
/// thread. On expiry the pending pull is cancelled; a source that ignores
/// cancellation holds the error back until that pull returns.
pub struct Timeout<S> {
  source: S,
  duration: Duration,
}

impl<S> Timeout<S> {
  pub(crate) fn new(source: S, duration: Duration) -> Self { Timeout { source, duration } }
}

impl<S: Observable> Observable for Timeout<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    Subscription::new(TimeoutCursor {
      stage: Stage::Armed(self.source.subscribe()),
      duration: self.duration,
    })
  }
}

enum Stage<T> {
  Armed(Subscription<T>),
  Passing(Subscription<T>),
  Done,
}

struct TimeoutCursor<T> {
  stage: Stage<T>,
  duration: Duration,
}

impl<T: Send + 'static> TimeoutCursor<T> {
  fn first_pull(&mut self, upstream: Subscription<T>) -> Option<Result<T>> {
    // Nested scopes started by the first pull hang off `deadline`, so only
    // they are torn down on expiry.
    let deadline = CancelToken::current().child();
    let pull_token = deadline.clone();
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut scope = TaskScope::new("timeout");
    let spawned = scope.spawn(move |_| {
      let mut upstream = upstream;
      let _enter = pull_token.enter();
      let item = upstream.next();
      let _ = tx.send((item, upstream));
    });
    if let Err(err) = spawned {
      return Some(Err(err));
    }

    select! {
      recv(rx) -> msg => {
        scope.join();
        let (item, upstream) = msg.ok()?;
        if matches!(item, Some(Ok(_))) {
          self.stage = Stage::Passing(upstream);
        }
        item
      }
      recv(crossbeam_channel::after(self.duration)) -> _ => {
        debug!(duration = ?self.duration, "timeout expired");
        deadline.cancel();
        drop(scope);
        Some(Err(RxError::Timeout))
      }
    }
  }
}

impl<T: Send + 'static> Iterator for TimeoutCursor<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Result<T>> {
    match std::mem::replace(&mut self.stage, Stage::Done) {
      Stage::Armed(upstream) => self.first_pull(upstream),
      Stage::Passing(mut upstream) => {
        let item = upstream.next();
        if matches!(item, Some(Ok(_))) {
          self.stage = Stage::Passing(upstream);
        }
        item
      }
      Stage::Done => None,
    }
  }
}
