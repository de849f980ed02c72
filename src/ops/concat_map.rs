use std::sync::Arc;

use crate::{error::Result, observable::Observable, subscription::Subscription};

/// Projects every source value to an inner observable and emits the inner
/// runs one after another.
///
/// Runs on the pulling thread: the next source value is not pulled until the
/// current inner run has completed. An error from either side terminates the
/// run.
pub struct ConcatMap<S, F> {
  source: S,
  project: Arc<F>,
}

impl<S, F> ConcatMap<S, F> {
  pub(crate) fn new(source: S, project: F) -> Self {
    ConcatMap { source, project: Arc::new(project) }
  }
}

impl<S, F, O> Observable for ConcatMap<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> O + Send + Sync + 'static,
  O: Observable + 'static,
{
  type Item = O::Item;

  fn subscribe(&self) -> Subscription<O::Item> {
    Subscription::new(ConcatMapCursor::<S::Item, F, O> {
      outer: self.source.subscribe(),
      project: self.project.clone(),
      inner: None,
    })
  }
}

struct ConcatMapCursor<T, F, O: Observable> {
  outer: Subscription<T>,
  project: Arc<F>,
  inner: Option<Subscription<O::Item>>,
}

impl<T, F, O> Iterator for ConcatMapCursor<T, F, O>
where
  F: Fn(T) -> O,
  O: Observable,
{
  type Item = Result<O::Item>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(inner) = self.inner.as_mut() {
        match inner.next() {
          None => self.inner = None,
          item => return item,
        }
      }
      match self.outer.next()? {
        Ok(v) => self.inner = Some((self.project)(v).subscribe()),
        Err(err) => return Some(Err(err)),
      }
    }
  }
}
