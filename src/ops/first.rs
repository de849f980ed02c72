use crate::{error::RxError, observable::Observable, subscription::Subscription};

/// Emits the first value and completes, releasing the upstream right away.
///
/// An empty source fails with [`RxError::Empty`].
pub struct First<S> {
  source: S,
}

impl<S> First<S> {
  pub(crate) fn new(source: S) -> Self { First { source } }
}

impl<S: Observable> Observable for First<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut upstream = Some(self.source.subscribe());
    Subscription::new(std::iter::from_fn(move || {
      let mut upstream = upstream.take()?;
      Some(upstream.next().unwrap_or(Err(RxError::Empty)))
    }))
  }
}

/// Emits the last value once the source completes.
///
/// An empty source fails with [`RxError::Empty`].
pub struct Last<S> {
  source: S,
}

impl<S> Last<S> {
  pub(crate) fn new(source: S) -> Self { Last { source } }
}

impl<S: Observable> Observable for Last<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let mut upstream = Some(self.source.subscribe());
    Subscription::new(std::iter::from_fn(move || {
      let mut last = None;
      for item in upstream.take()? {
        match item {
          Ok(v) => last = Some(v),
          Err(err) => return Some(Err(err)),
        }
      }
      Some(last.ok_or(RxError::Empty))
    }))
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn first_takes_head_of_infinite_source() {
    let out: Vec<_> = observable::from_iter(5..).first().subscribe().flatten().collect();
    assert_eq!(out, vec![5]);
  }

  #[test]
  fn first_of_empty_fails() {
    let mut sub = observable::empty::<i32>().first().subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::Empty))));
  }

  #[test]
  fn last_waits_for_completion() {
    let out: Vec<_> = observable::of(vec![1, 2, 3]).last().subscribe().flatten().collect();
    assert_eq!(out, vec![3]);
  }

  #[test]
  fn last_propagates_error() {
    let source = observable::of(vec![1]).concat_with(observable::throw_err(|| RxError::NotFound));
    let mut sub = source.last().subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::NotFound))));
  }

  #[test]
  fn last_of_empty_fails() {
    let mut sub = observable::empty::<()>().last().subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::Empty))));
  }
}
