//! The live run of a sequence.
//!
//! A [`Subscription`] is a pull cursor: every call to [`Iterator::next`]
//! advances the producer by at most one event and returns
//!
//! - `Some(Ok(value))` for a value,
//! - `Some(Err(err))` for the terminal error,
//! - `None` once the run has completed.
//!
//! The cursor is fused at the first terminal event: the upstream chain is
//! dropped on the spot (releasing any task, timer or channel it owns) and every
//! later pull returns `None`. Dropping a subscription early is how a consumer
//! says "no more wanted".

use std::{fmt, ops::ControlFlow};

use crate::{error::Result, observer::Observer};

type Cursor<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// One independent, resource-owning run of an observable.
#[must_use = "a subscription produces nothing until it is pulled"]
pub struct Subscription<T> {
  cursor: Option<Cursor<T>>,
}

impl<T> Subscription<T> {
  /// Wraps a pull cursor.
  pub fn new<I>(cursor: I) -> Self
  where
    I: Iterator<Item = Result<T>> + Send + 'static,
  {
    Subscription { cursor: Some(Box::new(cursor)) }
  }

  /// A run that is already complete.
  pub fn closed() -> Self { Subscription { cursor: None } }

  /// `true` once the run has terminated or was unsubscribed.
  #[inline]
  pub fn is_closed(&self) -> bool { self.cursor.is_none() }

  /// Stops the run and releases everything it owns.
  pub fn unsubscribe(&mut self) { self.cursor = None; }

  /// Pushes every event into `observer` on the calling thread.
  ///
  /// The run stops early as soon as the observer reports itself closed after a
  /// value; in that case neither `error` nor `complete` is called.
  pub fn drive<O>(mut self, mut observer: O)
  where
    O: Observer<T>,
  {
    loop {
      if observer.is_closed() {
        self.unsubscribe();
        return;
      }
      match self.next() {
        Some(Ok(value)) => observer.next(value),
        Some(Err(err)) => return observer.error(err),
        None => return observer.complete(),
      }
    }
  }

  /// Calls `f` for each value until it breaks or the run terminates.
  ///
  /// Returns the terminal error, if any. Breaking out counts as a clean stop.
  pub fn for_each_until<F>(mut self, mut f: F) -> Result<()>
  where
    F: FnMut(T) -> ControlFlow<()>,
  {
    while let Some(item) = self.next() {
      if f(item?).is_break() {
        break;
      }
    }
    Ok(())
  }
}

impl<T> Iterator for Subscription<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Self::Item> {
    let item = self.cursor.as_mut()?.next();
    if !matches!(item, Some(Ok(_))) {
      self.cursor = None;
    }
    item
  }
}

impl<T> std::iter::FusedIterator for Subscription<T> {}

impl<T> fmt::Debug for Subscription<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  use super::*;
  use crate::error::RxError;

  struct DropFlag(Arc<AtomicBool>);

  impl Drop for DropFlag {
    fn drop(&mut self) { self.0.store(true, Ordering::SeqCst); }
  }

  #[test]
  fn fused_after_error() {
    let mut sub =
      Subscription::new(vec![Ok(1), Err(RxError::Empty), Ok(2)].into_iter());
    assert!(matches!(sub.next(), Some(Ok(1))));
    assert!(matches!(sub.next(), Some(Err(RxError::Empty))));
    assert!(sub.is_closed());
    assert!(sub.next().is_none());
  }

  #[test]
  fn terminal_event_releases_cursor() {
    let dropped = Arc::new(AtomicBool::new(false));
    let guard = DropFlag(dropped.clone());
    let mut sub = Subscription::new(std::iter::once(Ok(1)).map(move |v| {
      let _keep = &guard;
      v
    }));
    assert!(matches!(sub.next(), Some(Ok(1))));
    assert!(!dropped.load(Ordering::SeqCst));
    assert!(sub.next().is_none());
    assert!(dropped.load(Ordering::SeqCst));
  }

  #[test]
  fn unsubscribe_releases_cursor() {
    let dropped = Arc::new(AtomicBool::new(false));
    let guard = DropFlag(dropped.clone());
    let mut sub = Subscription::new(std::iter::repeat(0).map(move |v| {
      let _keep = &guard;
      Ok(v)
    }));
    sub.next();
    sub.unsubscribe();
    assert!(dropped.load(Ordering::SeqCst));
    assert!(sub.next().is_none());
  }

  #[test]
  fn for_each_until_breaks_cleanly() {
    let sub = Subscription::new((0..).map(Ok));
    let mut seen = vec![];
    let res = sub.for_each_until(|v| {
      seen.push(v);
      if v == 2 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    });
    assert!(res.is_ok());
    assert_eq!(seen, vec![0, 1, 2]);
  }
}
