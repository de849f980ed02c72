use super::Observable;
use crate::{error::Result, subscription::Subscription};

/// Creates an observable from a factory of event iterators.
///
/// `factory` runs once per subscription; its iterator is the run. An `Err`
/// item terminates the run, and exhaustion completes it.
///
/// # Examples
///
/// ```
/// use rxflow::prelude::*;
///
/// let countdown = observable::create(|| {
///   let mut n = 3;
///   std::iter::from_fn(move || {
///     n -= 1;
///     (n > 0).then(|| Ok(n))
///   })
/// });
/// let out: Vec<_> = countdown.subscribe().flatten().collect();
/// assert_eq!(out, vec![2, 1]);
/// ```
pub fn create<T, F, I>(factory: F) -> Create<F>
where
  F: Fn() -> I + Send + Sync,
  I: IntoIterator<Item = Result<T>>,
  I::IntoIter: Send + 'static,
  T: Send + 'static,
{
  Create(factory)
}

#[derive(Clone)]
pub struct Create<F>(F);

impl<T, F, I> Observable for Create<F>
where
  F: Fn() -> I + Send + Sync,
  I: IntoIterator<Item = Result<T>>,
  I::IntoIter: Send + 'static,
  T: Send + 'static,
{
  type Item = T;

  fn subscribe(&self) -> Subscription<T> { Subscription::new((self.0)().into_iter()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::RxError;

  #[test]
  fn error_item_terminates() {
    let source = create(|| vec![Ok(1), Err(RxError::Timeout), Ok(2)]);
    let mut sub = source.subscribe();
    assert!(matches!(sub.next(), Some(Ok(1))));
    assert!(matches!(sub.next(), Some(Err(RxError::Timeout))));
    assert!(sub.next().is_none());
  }
}
