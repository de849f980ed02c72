use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::{debug, trace};

use super::join::{forward, hand_off, Emission, FanIn};
use crate::{
  error::Result,
  observable::Observable,
  scheduler::{CancelToken, TaskScope},
  subscription::Subscription,
};

const OUTER: usize = 0;

/// Projects every source value to an inner observable and mirrors only the
/// most recent inner run.
///
/// A new source value cancels the current inner run and waits for its task
/// to exit before the next inner run starts, so no value of a replaced run is
/// emitted after the switch. The run completes once the source and the last
/// inner run have completed; an error from either side terminates it.
pub struct SwitchMap<S, F> {
  source: S,
  project: Arc<F>,
}

impl<S, F> SwitchMap<S, F> {
  pub(crate) fn new(source: S, project: F) -> Self {
    SwitchMap { source, project: Arc::new(project) }
  }
}

impl<S, F, O> Observable for SwitchMap<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> O + Send + Sync + 'static,
  O: Observable + 'static,
{
  type Item = O::Item;

  fn subscribe(&self) -> Subscription<O::Item> {
    Subscription::new(SwitchMapCursor::<S::Item, F, O> {
      pending: Some(self.source.subscribe()),
      project: self.project.clone(),
      fan: None,
    })
  }
}

fn switch<T, F, O>(
  mut outer: Subscription<T>,
  project: Arc<F>,
  tx: Sender<Emission<O::Item>>,
  token: CancelToken,
) where
  F: Fn(T) -> O,
  O: Observable,
{
  let mut current: Option<TaskScope> = None;
  let mut started = OUTER;
  while !token.is_cancelled() {
    match outer.next() {
      Some(Ok(v)) => {
        if let Some(mut previous) = current.take() {
          trace!(inner = started, "switch_map replacing inner run");
          previous.shutdown();
        }
        started += 1;
        let index = started;
        let inner = project(v).subscribe();
        let inner_tx = tx.clone();
        let mut scope = TaskScope::new("switch_map");
        if let Err(err) = scope.spawn(move |token| forward(index, inner, inner_tx, token)) {
          hand_off(&tx, Emission::Error(OUTER, err), &token);
          break;
        }
        current = Some(scope);
      }
      Some(Err(err)) => {
        hand_off(&tx, Emission::Error(OUTER, err), &token);
        break;
      }
      None => break,
    }
  }
  drop(tx);
  if let Some(mut last) = current {
    last.join();
  }
}

struct SwitchMapCursor<T, F, O: Observable> {
  pending: Option<Subscription<T>>,
  project: Arc<F>,
  fan: Option<FanIn<Emission<O::Item>>>,
}

impl<T, F, O> SwitchMapCursor<T, F, O>
where
  T: Send + 'static,
  F: Fn(T) -> O + Send + Sync + 'static,
  O: Observable + 'static,
{
  fn start(&mut self, outer: Subscription<T>) -> Result<()> {
    let (mut fan, tx) = FanIn::new("switch_map");
    let project = self.project.clone();
    fan.spawn(move |token| switch(outer, project, tx, token))?;
    self.fan = Some(fan);
    Ok(())
  }

  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }
}

impl<T, F, O> Iterator for SwitchMapCursor<T, F, O>
where
  T: Send + 'static,
  F: Fn(T) -> O + Send + Sync + 'static,
  O: Observable + 'static,
{
  type Item = Result<O::Item>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(outer) = self.pending.take() {
      if let Err(err) = self.start(outer) {
        self.finish();
        return Some(Err(err));
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
          debug!(source = index, error = %err, "switch_map run failed");
          self.finish();
          return Some(Err(err));
        }
        Emission::Complete(_) => {}
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn only_the_latest_inner_run_is_mirrored() {
    let out: Vec<_> = observable::of(vec![1, 2, 3])
      .switch_map(|v| observable::timer(Duration::from_millis(50)).map(move |_| v))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![3]);
  }

  #[test]
  fn inner_runs_finish_when_the_source_is_slow() {
    let out: Vec<_> = observable::interval(Duration::from_millis(30))
      .take(2)
      .switch_map(|v| observable::of(vec![v * 10, v * 10 + 1]))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![0, 1, 10, 11]);
  }

  #[test]
  fn inner_error_terminates() {
    let mut sub = observable::of(vec![1])
      .switch_map(|_| observable::throw_err::<i32, _>(|| RxError::OutOfRange))
      .subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::OutOfRange))));
    assert!(sub.next().is_none());
  }
}
