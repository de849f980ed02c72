use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Select};

use super::join::{assert_arity, forward, Emission, FAN_IN_CAPACITY};
use crate::{
  error::Result, observable::Observable, scheduler::TaskScope, subscription::Subscription,
};

/// Combines the i-th values of every source into one `Vec`.
///
/// Each source is pulled concurrently by its own task into a private
/// rendezvous channel. Every lane stays selected while a row is assembled, so
/// a source that is ahead of the others queues its values in the cursor. The
/// run completes once a completed source has no queued value left (a
/// partially assembled row is dropped) and the first error from any source
/// terminates it, even while other sources are still silent.
///
/// # Panics
///
/// If fewer than two sources are given.
pub fn zip<S: Observable>(sources: Vec<S>) -> Zip<S> {
  assert_arity("zip", sources.len());
  Zip { sources }
}

pub struct Zip<S> {
  sources: Vec<S>,
}

impl<S: Observable> Observable for Zip<S> {
  type Item = Vec<S::Item>;

  fn subscribe(&self) -> Subscription<Vec<S::Item>> {
    Subscription::new(ZipCursor {
      pending: Some(self.sources.iter().map(Observable::subscribe).collect()),
      lanes: Vec::new(),
      scope: None,
    })
  }
}

/// One source as seen by the cursor.
struct Lane<T> {
  rx: Receiver<Emission<T>>,
  queued: VecDeque<T>,
  completed: bool,
}

impl<T> Lane<T> {
  #[inline]
  fn is_exhausted(&self) -> bool { self.completed && self.queued.is_empty() }
}

struct ZipCursor<T> {
  pending: Option<Vec<Subscription<T>>>,
  // Declared before `scope` so pending sends fail fast on drop.
  lanes: Vec<Lane<T>>,
  scope: Option<TaskScope>,
}

impl<T: Send + 'static> ZipCursor<T> {
  fn start(&mut self, sources: Vec<Subscription<T>>) -> Result<()> {
    let mut scope = TaskScope::new("zip");
    for (index, upstream) in sources.into_iter().enumerate() {
      let (tx, rx) = crossbeam_channel::bounded(FAN_IN_CAPACITY);
      scope.spawn(move |token| forward(index, upstream, tx, token))?;
      self.lanes.push(Lane { rx, queued: VecDeque::new(), completed: false });
    }
    self.scope = Some(scope);
    Ok(())
  }

  fn finish(&mut self) {
    self.lanes.clear();
    if let Some(mut scope) = self.scope.take() {
      scope.shutdown();
    }
  }
}

impl<T: Send + 'static> Iterator for ZipCursor<T> {
  type Item = Result<Vec<T>>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(sources) = self.pending.take() {
      if let Err(err) = self.start(sources) {
        self.finish();
        return Some(Err(err));
      }
    }
    self.scope.as_ref()?;

    let item = assemble(&mut self.lanes);
    if !matches!(item, Some(Ok(_))) {
      self.finish();
    }
    item
  }
}

/// Receives from every open lane until each one has a value queued.
///
/// Returns early with the first error seen on any lane, or with `None` once a
/// completed lane has nothing left to contribute.
fn assemble<T>(lanes: &mut [Lane<T>]) -> Option<Result<Vec<T>>> {
  loop {
    if lanes.iter().all(|lane| !lane.queued.is_empty()) {
      return Some(Ok(lanes.iter_mut().filter_map(|lane| lane.queued.pop_front()).collect()));
    }
    if lanes.iter().any(Lane::is_exhausted) {
      return None;
    }

    // Not empty: with every lane completed, one without a queued value would
    // have ended the run above.
    let open: Vec<usize> = (0..lanes.len()).filter(|i| !lanes[*i].completed).collect();
    let mut select = Select::new();
    for &i in &open {
      select.recv(&lanes[i].rx);
    }
    let op = select.select();
    let index = open[op.index()];
    match op.recv(&lanes[index].rx) {
      Ok(Emission::Next(_, v)) => lanes[index].queued.push_back(v),
      Ok(Emission::Error(_, err)) => return Some(Err(err)),
      Ok(Emission::Complete(_)) | Err(_) => lanes[index].completed = true,
    }
  }
}
