use std::sync::Arc;

use super::join::assert_arity;
use crate::{error::Result, observable::Observable, subscription::Subscription};

/// Emits every value of the first source, then of the second, and so on.
///
/// Sources run strictly one after another on the pulling thread: source `i+1`
/// is not subscribed until source `i` has completed. The first error
/// terminates the run and the remaining sources are never started.
///
/// # Panics
///
/// If fewer than two sources are given.
///
/// # Example
///
/// ```
/// use rxflow::prelude::*;
///
/// let values: Vec<_> = observable::concat(vec![
///   observable::of(vec![1, 2]),
///   observable::of(vec![3, 4]),
/// ])
/// .subscribe()
/// .flatten()
/// .collect();
/// assert_eq!(values, vec![1, 2, 3, 4]);
/// ```
pub fn concat<S: Observable>(sources: Vec<S>) -> Concat<S> {
  assert_arity("concat", sources.len());
  Concat { sources: Arc::new(sources) }
}

pub struct Concat<S> {
  sources: Arc<Vec<S>>,
}

impl<S: Observable + 'static> Observable for Concat<S> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    Subscription::new(ConcatCursor { sources: self.sources.clone(), next: 0, current: None })
  }
}

struct ConcatCursor<S: Observable> {
  sources: Arc<Vec<S>>,
  next: usize,
  current: Option<Subscription<S::Item>>,
}

impl<S: Observable> Iterator for ConcatCursor<S> {
  type Item = Result<S::Item>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if self.current.is_none() {
        let source = self.sources.get(self.next)?;
        self.next += 1;
        self.current = Some(source.subscribe());
      }
      match self.current.as_mut()?.next() {
        None => self.current = None,
        item => return item,
      }
    }
  }
}
