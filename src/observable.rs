//! The `Observable` trait, its combinators and the source constructors.
//!
//! An observable is a stateless blueprint: every call to
//! [`Observable::subscribe`] starts an independent run and hands back a
//! [`Subscription`] pull cursor. Nothing is produced until the cursor is
//! pulled, which is also the crate's backpressure mechanism.

use std::{hash::Hash, ops::ControlFlow, sync::Arc};

use crate::{
  either::Either,
  error::{Result, RxError},
  observer::{FnMutObserver, Observer, ObserverAll, UntilObserver},
  ops::{
    buffer::Buffer,
    buffer_count::BufferCount,
    catch_error::CatchError,
    concat_map::ConcatMap,
    default_if_empty::DefaultIfEmpty,
    delay::Delay,
    distinct::{Distinct, DistinctUntilChanged},
    element_at::ElementAt,
    filter::Filter,
    first::{First, Last},
    into_stream::IntoStream,
    map::{Map, TryMap},
    merge_map::MergeMap,
    reduce::Reduce,
    retry::{Retry, RetryPolicy},
    scan::Scan,
    single::{Find, Single},
    skip::Skip,
    start_with::StartWith,
    switch_map::SwitchMap,
    take::Take,
    take_until::TakeUntil,
    take_while::{SkipWhile, TakeWhile},
    tap::Tap,
    timeout::Timeout,
    to_vec::ToVec,
  },
  scheduler::Duration,
  subscription::Subscription,
};

mod boxed;
mod create;
mod defer;
mod from_iter;
mod from_stream;
mod of;
mod timer;
mod trivial;

pub use boxed::BoxedObservable;
pub use create::{create, Create};
pub use defer::{defer, Defer};
pub use from_iter::{from_channel, from_iter, range, FromChannel, FromIter};
pub use from_stream::{from_stream, FromStream};
pub use of::{of, Of};
pub use timer::{interval, timer, timer_at, Interval, Timer};
pub use trivial::{empty, never, throw_err, Empty, Never, ThrowErr};

pub use crate::ops::{
  combine_latest::{combine_latest, CombineLatest},
  concat::{concat, Concat},
  fork_join::{fork_join, ForkJoin},
  merge::{merge, Merge},
  race::{race, Race},
  zip::{zip, Zip},
};

// ============================================================================
// Observable Trait
// ============================================================================

/// A blueprint of a sequence of values terminated by an error or completion.
///
/// Implementations must honor the run contract: zero or more values, then at
/// most one terminal event, and nothing afterwards. [`Subscription`] enforces
/// the "nothing afterwards" half by fusing at the first terminal event.
pub trait Observable: Send + Sync {
  type Item: Send + 'static;

  /// Starts an independent run.
  fn subscribe(&self) -> Subscription<Self::Item>;
}

impl<S: Observable + ?Sized> Observable for Arc<S> {
  type Item = S::Item;

  #[inline]
  fn subscribe(&self) -> Subscription<Self::Item> { (**self).subscribe() }
}

// ============================================================================
// ObservableExt Trait
// ============================================================================

/// Combinators available on every observable.
pub trait ObservableExt: Observable + Sized {
  // ==================== Push drivers ====================

  /// Runs the sequence on the calling thread, calling `next` for each value.
  fn subscribe_next<F>(&self, next: F)
  where
    F: FnMut(Self::Item),
  {
    self.subscribe().drive(FnMutObserver(next));
  }

  /// Runs the sequence on the calling thread with all three callbacks.
  fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C)
  where
    N: FnMut(Self::Item),
    E: FnOnce(RxError),
    C: FnOnce(),
  {
    self.subscribe().drive(ObserverAll { next, error, complete });
  }

  /// Runs the sequence on the calling thread until `next` breaks.
  fn subscribe_until<F>(&self, next: F)
  where
    F: FnMut(Self::Item) -> ControlFlow<()>,
  {
    self.subscribe().drive(UntilObserver::new(next));
  }

  /// Runs the sequence on the calling thread into `observer`.
  fn subscribe_with<O>(&self, observer: O)
  where
    O: Observer<Self::Item>,
  {
    self.subscribe().drive(observer);
  }

  // ==================== Composition ====================

  /// Applies an operator function: `source.pipe(op)` is `op(source)`.
  #[inline]
  fn pipe<O, F>(self, op: F) -> O
  where
    F: FnOnce(Self) -> O,
  {
    op(self)
  }

  /// Erases the concrete type of this observable.
  fn box_it(self) -> BoxedObservable<Self::Item>
  where
    Self: 'static,
  {
    BoxedObservable::new(self)
  }

  // ==================== Transformation ====================

  fn map<O, F>(self, f: F) -> Map<Self, F>
  where
    F: Fn(Self::Item) -> O + Send + Sync + 'static,
    O: Send + 'static,
  {
    Map::new(self, f)
  }

  /// Like `map`, but the projection may fail; a failure terminates the run.
  fn try_map<O, F>(self, f: F) -> TryMap<Self, F>
  where
    F: Fn(Self::Item) -> Result<O> + Send + Sync + 'static,
    O: Send + 'static,
  {
    TryMap::new(self, f)
  }

  fn tap<F>(self, f: F) -> Tap<Self, F>
  where
    F: Fn(&Self::Item) + Send + Sync + 'static,
  {
    Tap::new(self, f)
  }

  fn start_with(self, values: Vec<Self::Item>) -> StartWith<Self>
  where
    Self::Item: Clone + Sync,
  {
    StartWith::new(self, values)
  }

  fn to_vec(self) -> ToVec<Self> { ToVec::new(self) }

  fn buffer_count(self, count: usize) -> BufferCount<Self> { BufferCount::new(self, count) }

  /// Collects values until `notifier` emits, then emits the collected batch.
  fn buffer<N>(self, notifier: N) -> Buffer<Self, N>
  where
    N: Observable,
    Self::Item: Sync,
  {
    Buffer::new(self, notifier)
  }

  /// Emits the values collected during each `period`, including empty
  /// batches.
  fn buffer_time(self, period: Duration) -> Buffer<Self, Interval>
  where
    Self::Item: Sync,
  {
    Buffer::new(self, interval(period))
  }

  /// Emits every intermediate result of folding the values into `initial`.
  fn scan<A, F>(self, initial: A, f: F) -> Scan<Self, F, A>
  where
    F: Fn(A, Self::Item) -> A + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
  {
    Scan::new(self, initial, f)
  }

  /// Emits the fold of every value into `initial` once the source completes.
  fn reduce<A, F>(self, initial: A, f: F) -> Reduce<Self, F, A>
  where
    F: Fn(A, Self::Item) -> A + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
  {
    Reduce::new(self, initial, f)
  }

  // ==================== Higher-order joins ====================

  /// Merges the inner observables projected from every value, concurrently.
  fn merge_map<O, F>(self, f: F) -> MergeMap<Self, F>
  where
    F: Fn(Self::Item) -> O + Send + Sync + 'static,
    O: Observable + 'static,
  {
    MergeMap::new(self, f)
  }

  /// Runs the inner observables projected from every value one after another.
  fn concat_map<O, F>(self, f: F) -> ConcatMap<Self, F>
  where
    F: Fn(Self::Item) -> O + Send + Sync + 'static,
    O: Observable + 'static,
  {
    ConcatMap::new(self, f)
  }

  /// Mirrors only the inner observable projected from the latest value.
  fn switch_map<O, F>(self, f: F) -> SwitchMap<Self, F>
  where
    F: Fn(Self::Item) -> O + Send + Sync + 'static,
    O: Observable + 'static,
  {
    SwitchMap::new(self, f)
  }

  // ==================== Filtering ====================

  fn filter<F>(self, f: F) -> Filter<Self, F>
  where
    F: Fn(&Self::Item) -> bool + Send + Sync + 'static,
  {
    Filter::new(self, f)
  }

  fn take(self, count: usize) -> Take<Self> { Take::new(self, count) }

  fn skip(self, count: usize) -> Skip<Self> { Skip::new(self, count) }

  /// Emits values until `predicate` first fails, then completes.
  fn take_while<F>(self, predicate: F) -> TakeWhile<Self, F>
  where
    F: Fn(&Self::Item) -> bool + Send + Sync + 'static,
  {
    TakeWhile::new(self, predicate)
  }

  /// Drops values until `predicate` first fails.
  fn skip_while<F>(self, predicate: F) -> SkipWhile<Self, F>
  where
    F: Fn(&Self::Item) -> bool + Send + Sync + 'static,
  {
    SkipWhile::new(self, predicate)
  }

  /// Mirrors the source until `notifier` emits its first value.
  fn take_until<N>(self, notifier: N) -> TakeUntil<Self, N>
  where
    N: Observable,
  {
    TakeUntil::new(self, notifier)
  }

  /// Drops values whose key has been seen before.
  fn distinct<K, F>(self, key: F) -> Distinct<Self, F>
  where
    F: Fn(&Self::Item) -> K + Send + Sync + 'static,
    K: Eq + Hash + Send + 'static,
  {
    Distinct::new(self, key)
  }

  /// Drops values equal to their immediate predecessor.
  fn distinct_until_changed(self) -> DistinctUntilChanged<Self>
  where
    Self::Item: PartialEq + Clone,
  {
    DistinctUntilChanged::new(self)
  }

  fn default_if_empty(self, value: Self::Item) -> DefaultIfEmpty<Self>
  where
    Self::Item: Clone + Sync,
  {
    DefaultIfEmpty::new(self, value)
  }

  /// Emits the first value; fails with [`RxError::Empty`] on an empty source.
  fn first(self) -> First<Self> { First::new(self) }

  /// Emits the last value; fails with [`RxError::Empty`] on an empty source.
  fn last(self) -> Last<Self> { Last::new(self) }

  /// Emits the value at `index`, or `default`, or fails with
  /// [`RxError::OutOfRange`].
  fn element_at(self, index: usize, default: Option<Self::Item>) -> ElementAt<Self>
  where
    Self::Item: Clone + Sync,
  {
    ElementAt::new(self, index, default)
  }

  /// Emits the only value matching `predicate`.
  fn single<F>(self, predicate: F) -> Single<Self, F>
  where
    F: Fn(&Self::Item, usize) -> bool + Send + Sync + 'static,
  {
    Single::new(self, predicate)
  }

  /// Emits the first value matching `predicate`, or fails with
  /// [`RxError::NotFound`].
  fn find<F>(self, predicate: F) -> Find<Self, F>
  where
    F: Fn(&Self::Item, usize) -> bool + Send + Sync + 'static,
  {
    Find::new(self, predicate)
  }

  // ==================== Time & errors ====================

  /// Waits `duration` before starting to pull the source.
  fn delay(self, duration: Duration) -> Delay<Self> { Delay::new(self, duration) }

  /// Fails with [`RxError::Timeout`] if the first event takes longer than
  /// `duration`.
  fn timeout(self, duration: Duration) -> Timeout<Self> { Timeout::new(self, duration) }

  /// Resubscribes on error according to `policy`.
  fn retry<P>(self, policy: P) -> Retry<Self, P>
  where
    P: RetryPolicy,
  {
    Retry::new(self, policy)
  }

  /// Switches to the observable returned by `handler` on the first error.
  fn catch_error<O, H>(self, handler: H) -> CatchError<Self, H>
  where
    H: Fn(RxError) -> O + Send + Sync + 'static,
    O: Observable<Item = Self::Item> + 'static,
  {
    CatchError::new(self, handler)
  }

  // ==================== Joins ====================

  fn merge_with<O>(self, other: O) -> Merge<BoxedObservable<Self::Item>>
  where
    Self: 'static,
    O: Observable<Item = Self::Item> + 'static,
  {
    merge(vec![self.box_it(), other.box_it()])
  }

  fn concat_with<O>(self, other: O) -> Concat<BoxedObservable<Self::Item>>
  where
    Self: 'static,
    O: Observable<Item = Self::Item> + 'static,
  {
    concat(vec![self.box_it(), other.box_it()])
  }

  fn race_with<O>(self, other: O) -> Race<BoxedObservable<Self::Item>>
  where
    Self: 'static,
    O: Observable<Item = Self::Item> + 'static,
  {
    race(vec![self.box_it(), other.box_it()])
  }

  /// Pairs the i-th value of `self` with the i-th value of `other`.
  fn zip_with<O>(self, other: O) -> BoxedObservable<(Self::Item, O::Item)>
  where
    Self: 'static,
    O: Observable + 'static,
  {
    let left: BoxedObservable<Either<Self::Item, O::Item>> = self.map(Either::Left).box_it();
    let right = other.map(Either::Right).box_it();
    zip(vec![left, right]).map(Either::into_pair).box_it()
  }

  /// Emits the latest value of both sources whenever either emits, once both
  /// have emitted.
  fn combine_latest_with<O>(self, other: O) -> BoxedObservable<(Self::Item, O::Item)>
  where
    Self: 'static,
    Self::Item: Clone,
    O: Observable + 'static,
    O::Item: Clone,
  {
    let left: BoxedObservable<Either<Self::Item, O::Item>> = self.map(Either::Left).box_it();
    let right = other.map(Either::Right).box_it();
    combine_latest(vec![left, right]).map(Either::into_pair).box_it()
  }

  // ==================== Async interop ====================

  /// Bridges a run of this observable into a `futures::Stream`.
  fn into_stream(self) -> IntoStream<Self::Item> { IntoStream::new(self.subscribe()) }
}

impl<S: Observable> ObservableExt for S {}
