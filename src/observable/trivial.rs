use std::marker::PhantomData;

use super::Observable;
use crate::{error::RxError, scheduler::CancelToken, subscription::Subscription};

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
pub fn empty<T>() -> Empty<T> { Empty(PhantomData) }

pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Clone for Empty<T> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<T: Send + 'static> Observable for Empty<T> {
  type Item = T;

  fn subscribe(&self) -> Subscription<T> { Subscription::closed() }
}

/// Creates an observable that never emits anything.
///
/// A pull blocks until the pulling task is cancelled, at which point the run
/// completes. On a thread outside any task scope it blocks forever.
pub fn never<T>() -> Never<T> { Never(PhantomData) }

pub struct Never<T>(PhantomData<fn() -> T>);

impl<T> Clone for Never<T> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<T: Send + 'static> Observable for Never<T> {
  type Item = T;

  fn subscribe(&self) -> Subscription<T> {
    Subscription::new(std::iter::from_fn(|| {
      let _ = CancelToken::current().cancelled().recv();
      None
    }))
  }
}

/// Creates an observable that emits no values and terminates with the error
/// built by `factory`, called once per subscription.
pub fn throw_err<T, F>(factory: F) -> ThrowErr<T, F>
where
  F: Fn() -> RxError + Send + Sync,
{
  ThrowErr { factory, _item: PhantomData }
}

pub struct ThrowErr<T, F> {
  factory: F,
  _item: PhantomData<fn() -> T>,
}

impl<T, F: Clone> Clone for ThrowErr<T, F> {
  fn clone(&self) -> Self { ThrowErr { factory: self.factory.clone(), _item: PhantomData } }
}

impl<T, F> Observable for ThrowErr<T, F>
where
  T: Send + 'static,
  F: Fn() -> RxError + Send + Sync,
{
  type Item = T;

  fn subscribe(&self) -> Subscription<T> {
    Subscription::new(std::iter::once(Err((self.factory)())))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scheduler::{Duration, TaskScope};

  #[test]
  fn empty_is_closed_from_the_start() {
    let sub = empty::<i32>().subscribe();
    assert!(sub.is_closed());
  }

  #[test]
  fn throw_err_emits_one_error() {
    let mut sub = throw_err::<(), _>(|| RxError::NotFound).subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::NotFound))));
    assert!(sub.next().is_none());
  }

  #[test]
  fn never_is_released_by_cancellation() {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let mut scope = TaskScope::new("never");
    scope
      .spawn(move |_| {
        let mut sub = never::<i32>().subscribe();
        tx.send(sub.next().is_none()).unwrap();
      })
      .unwrap();
    std::thread::sleep(Duration::from_millis(20));
    scope.shutdown();
    assert_eq!(rx.try_recv(), Ok(true));
  }
}
