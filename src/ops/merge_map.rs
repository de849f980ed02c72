use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::debug;

use super::join::{forward, hand_off, Emission, FanIn};
use crate::{
  error::Result,
  observable::Observable,
  scheduler::{CancelToken, TaskScope},
  subscription::Subscription,
};

/// Index of the outer source in the node's emissions; inner runs count from 1.
const OUTER: usize = 0;

/// Projects every source value to an inner observable and merges all inner
/// runs concurrently.
///
/// One task pulls the source and starts a task per inner observable in a
/// nested scope, so inner runs overlap freely and their values come out in
/// arrival order. The run completes once the source and every inner run have
/// completed. The first error from any of them cancels everything else and
/// terminates the run.
pub struct MergeMap<S, F> {
  source: S,
  project: Arc<F>,
}

impl<S, F> MergeMap<S, F> {
  pub(crate) fn new(source: S, project: F) -> Self {
    MergeMap { source, project: Arc::new(project) }
  }
}

impl<S, F, O> Observable for MergeMap<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> O + Send + Sync + 'static,
  O: Observable + 'static,
{
  type Item = O::Item;

  fn subscribe(&self) -> Subscription<O::Item> {
    Subscription::new(MergeMapCursor::<S::Item, F, O> {
      pending: Some(self.source.subscribe()),
      project: self.project.clone(),
      fan: None,
    })
  }
}

/// Pulls `outer` and forwards each projected inner run from its own task.
///
/// Returns once the outer source has ended and every inner task has exited.
fn spread<T, F, O>(
  mut outer: Subscription<T>,
  project: Arc<F>,
  tx: Sender<Emission<O::Item>>,
  token: CancelToken,
) where
  F: Fn(T) -> O,
  O: Observable,
{
  let mut inners = TaskScope::new("merge_map");
  let mut started = OUTER;
  while !token.is_cancelled() {
    match outer.next() {
      Some(Ok(v)) => {
        started += 1;
        let index = started;
        let inner = project(v).subscribe();
        let inner_tx = tx.clone();
        if let Err(err) = inners.spawn(move |token| forward(index, inner, inner_tx, token)) {
          hand_off(&tx, Emission::Error(OUTER, err), &token);
          break;
        }
      }
      Some(Err(err)) => {
        hand_off(&tx, Emission::Error(OUTER, err), &token);
        break;
      }
      None => break,
    }
  }
  drop(tx);
  inners.join();
}

struct MergeMapCursor<T, F, O: Observable> {
  pending: Option<Subscription<T>>,
  project: Arc<F>,
  fan: Option<FanIn<Emission<O::Item>>>,
}

impl<T, F, O> MergeMapCursor<T, F, O>
where
  T: Send + 'static,
  F: Fn(T) -> O + Send + Sync + 'static,
  O: Observable + 'static,
{
  fn start(&mut self, outer: Subscription<T>) -> Result<()> {
    let (mut fan, tx) = FanIn::new("merge_map");
    let project = self.project.clone();
    fan.spawn(move |token| spread(outer, project, tx, token))?;
    self.fan = Some(fan);
    Ok(())
  }

  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }
}

impl<T, F, O> Iterator for MergeMapCursor<T, F, O>
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
          debug!(source = index, error = %err, "merge_map run failed");
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
  fn inner_runs_overlap() {
    let out: Vec<_> = observable::of(vec![60u64, 5])
      .merge_map(|v| observable::timer(Duration::from_millis(v)).map(move |_| v))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![5, 60]);
  }

  #[test]
  fn completes_after_every_inner_run() {
    let mut out: Vec<_> = observable::range(0, 3)
      .merge_map(|v| observable::of(vec![v, v]))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    out.sort();
    assert_eq!(out, vec![0, 0, 1, 1, 2, 2]);
  }

  #[test]
  fn inner_error_cancels_the_rest() {
    let mut sub = observable::of(vec![1, 2])
      .merge_map(|v| {
        if v == 1 {
          observable::never::<i32>().box_it()
        } else {
          observable::throw_err(|| RxError::Timeout).box_it()
        }
      })
      .subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::Timeout))));
    assert!(sub.next().is_none());
  }

  #[test]
  fn outer_error_surfaces() {
    let mut sub = observable::throw_err::<i32, _>(|| RxError::NotFound)
      .merge_map(|v| observable::of(vec![v]))
      .subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::NotFound))));
    assert!(sub.next().is_none());
  }
}
