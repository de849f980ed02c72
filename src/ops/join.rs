//! Fan-in plumbing shared by the join operators.
//!
//! A join node starts one task per source inside a [`TaskScope`]. Tasks hand
//! their events to the node's single aggregating cursor over a rendezvous
//! channel; every hand-off also watches the task's cancellation token, so a
//! cancelled task never stays parked on a send the aggregator will not
//! receive.

use crossbeam_channel::{select, Receiver, Sender};

use crate::{
  error::{Result, RxError},
  scheduler::{CancelToken, TaskScope},
  subscription::Subscription,
};

/// Capacity of the fan-in channel between source tasks and the aggregator.
///
/// Zero makes every hand-off a rendezvous: a source is never more than one
/// value ahead of its consumer.
pub(crate) const FAN_IN_CAPACITY: usize = 0;

/// Panics unless a join operator got at least two sources.
#[track_caller]
pub(crate) fn assert_arity(operator: &str, sources: usize) {
  assert!(sources >= 2, "{operator} requires at least 2 sources, got {sources}");
}

/// One event of source `index`, as seen by the aggregator.
#[derive(Debug)]
pub(crate) enum Emission<T> {
  Next(usize, T),
  Error(usize, RxError),
  Complete(usize),
}

impl<T> Emission<T> {
  fn tag(index: usize, item: Option<Result<T>>) -> Self {
    match item {
      Some(Ok(v)) => Emission::Next(index, v),
      Some(Err(err)) => Emission::Error(index, err),
      None => Emission::Complete(index),
    }
  }

  fn is_terminal(&self) -> bool { !matches!(self, Emission::Next(..)) }
}

/// Sends `msg` unless `token` fires first.
///
/// Returns `false` when the message was not delivered, either because the task
/// was cancelled or because the aggregator is gone.
pub(crate) fn hand_off<M>(tx: &Sender<M>, msg: M, token: &CancelToken) -> bool {
  if token.is_cancelled() {
    return false;
  }
  select! {
    send(tx, msg) -> res => res.is_ok(),
    recv(token.cancelled()) -> _ => false,
  }
}

/// Pulls `upstream` until its terminal event, forwarding every event tagged
/// with `index`.
pub(crate) fn forward<T>(
  index: usize,
  mut upstream: Subscription<T>,
  tx: Sender<Emission<T>>,
  token: CancelToken,
) {
  while !token.is_cancelled() {
    let emission = Emission::tag(index, upstream.next());
    let terminal = emission.is_terminal();
    if !hand_off(&tx, emission, &token) || terminal {
      return;
    }
  }
}

/// The running half of a join node: its tasks and the receiving end of their
/// shared channel.
///
/// Dropping a `FanIn` cancels and joins every task.
pub(crate) struct FanIn<M> {
  // Declared first so it drops first: pending sends fail fast before the
  // scope joins.
  rx: Receiver<M>,
  scope: TaskScope,
}

impl<M: Send + 'static> FanIn<M> {
  /// Creates an empty node and the sender its tasks hand messages to.
  ///
  /// [`FanIn::recv`] reports the end of the node once every clone of the
  /// returned sender is gone, so callers must not keep one for themselves.
  pub(crate) fn new(name: &'static str) -> (Self, Sender<M>) {
    let (tx, rx) = crossbeam_channel::bounded(FAN_IN_CAPACITY);
    (FanIn { rx, scope: TaskScope::new(name) }, tx)
  }

  /// Starts `task` once per subscription, in source order, so task `i` of the
  /// scope pulls source `i`.
  pub(crate) fn start<T, F>(
    name: &'static str,
    sources: Vec<Subscription<T>>,
    task: F,
  ) -> Result<Self>
  where
    T: Send + 'static,
    F: Fn(usize, Subscription<T>, Sender<M>, CancelToken) + Clone + Send + 'static,
  {
    let (mut fan, tx) = Self::new(name);
    for (index, upstream) in sources.into_iter().enumerate() {
      let tx = tx.clone();
      let task = task.clone();
      fan.spawn(move |token| task(index, upstream, tx, token))?;
    }
    Ok(fan)
  }

  /// Adds one task to the node.
  pub(crate) fn spawn<F>(&mut self, task: F) -> Result<usize>
  where
    F: FnOnce(CancelToken) + Send + 'static,
  {
    self.scope.spawn(task)
  }

  /// Waits for the next message; `None` once every task has exited.
  pub(crate) fn recv(&self) -> Option<M> { self.rx.recv().ok() }

  #[inline]
  pub(crate) fn scope(&self) -> &TaskScope { &self.scope }

  /// Cancels the remaining tasks and waits for all of them.
  ///
  /// A panic raised by a task is resumed on the calling thread.
  pub(crate) fn finish(self) {
    let FanIn { rx, mut scope } = self;
    drop(rx);
    scope.shutdown();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    observable::{of, Observable},
    scheduler::Duration,
  };

  #[test]
  #[should_panic(expected = "merge requires at least 2 sources, got 1")]
  fn arity_is_checked() { assert_arity("merge", 1); }

  #[test]
  fn forward_tags_every_event() {
    let fan = FanIn::start("forward", vec![of(vec![1, 2]).subscribe()], forward).unwrap();
    assert!(matches!(fan.recv(), Some(Emission::Next(0, 1))));
    assert!(matches!(fan.recv(), Some(Emission::Next(0, 2))));
    assert!(matches!(fan.recv(), Some(Emission::Complete(0))));
    assert!(fan.recv().is_none());
    fan.finish();
  }

  #[test]
  fn dropping_fan_in_releases_parked_tasks() {
    let sources = vec![of(vec![1]).subscribe(), of(vec![2]).subscribe()];
    let fan = FanIn::start("drop", sources, forward).unwrap();
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(fan.scope().len(), 2);
    drop(fan);
  }

  #[test]
  fn hand_off_gives_up_when_cancelled() {
    let (tx, _rx) = crossbeam_channel::bounded::<i32>(0);
    let token = CancelToken::new();
    token.cancel();
    assert!(!hand_off(&tx, 1, &token));
  }
}
