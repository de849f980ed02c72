//! Every task started by an operator must be gone once its subscription is
//! drained or dropped.
//!
//! `live_tasks` is process-wide, so the cases run one at a time under a lock.

use std::thread;

use parking_lot::Mutex;
use rxflow::{prelude::*, scheduler::live_tasks};

mod common;

static SERIAL: Mutex<()> = parking_lot::const_mutex(());

fn assert_no_live_tasks() {
  assert_eq!(live_tasks(), 0, "tasks leaked");
}

fn slow() -> BoxedObservable<u64> { observable::interval(Duration::from_secs(5)).box_it() }

#[test]
fn drained_joins_release_their_tasks() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let fast = || observable::range(0, 3).map(|v| v as u64).box_it();

  let _ = observable::merge(vec![fast(), fast()]).subscribe().count();
  let _ = observable::combine_latest(vec![fast(), fast()]).subscribe().count();
  let _ = observable::race(vec![fast(), slow()]).subscribe().count();
  let _ = observable::fork_join(vec![fast(), fast()]).subscribe().count();
  let _ = observable::zip(vec![fast(), observable::of(vec![9]).box_it()]).subscribe().count();
  assert_no_live_tasks();
}

#[test]
fn early_drop_cancels_blocked_sources() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let mut merged = observable::merge(vec![slow(), observable::of(vec![1]).box_it()]).subscribe();
  assert!(matches!(merged.next(), Some(Ok(1))));
  drop(merged);

  let mut zipped = observable::zip(vec![slow(), observable::never().box_it()]).subscribe();
  let puller = thread::spawn(move || {
    let mut scope = TaskScope::new("puller");
    scope
      .spawn(move |_| {
        let _ = zipped.next();
      })
      .unwrap();
    thread::sleep(Duration::from_millis(20));
    scope.shutdown();
  });
  puller.join().unwrap();
  assert_no_live_tasks();
}

#[test]
fn errors_tear_down_siblings() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let out: Vec<_> = observable::merge(vec![
    slow(),
    observable::never().box_it(),
    observable::throw_err(|| RxError::Timeout).box_it(),
  ])
  .subscribe()
  .collect();
  assert!(matches!(out.as_slice(), [Err(RxError::Timeout)]));
  assert_no_live_tasks();
}

#[test]
fn nested_joins_are_torn_down_from_the_outside() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let inner = observable::merge(vec![slow(), observable::never().box_it()]);
  let mut outer =
    observable::race(vec![inner.box_it(), observable::timer(Duration::from_millis(10)).box_it()])
      .subscribe();
  assert!(matches!(outer.next(), Some(Ok(0))));
  drop(outer);
  assert_no_live_tasks();
}

#[test]
fn single_source_operators_release_helpers() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let _ = observable::never::<u64>().timeout(Duration::from_millis(10)).subscribe().count();
  let _ = slow().take_until(observable::timer(Duration::from_millis(10))).subscribe().count();
  let _ = observable::of(vec![1, 2]).buffer(observable::never::<()>()).subscribe().count();
  let _ =
    observable::never::<i32>().buffer_time(Duration::from_millis(5)).take(2).subscribe().count();
  assert_no_live_tasks();
}

#[test]
fn closed_subject_has_no_run_loop() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let subject = Subject::<i32>::new();
  let listener = subject.subscribe();
  subject.next(1);
  subject.close();
  drop(listener);
  assert_no_live_tasks();
}

#[test]
fn higher_order_joins_release_inner_tasks() {
  common::init_test_logging();
  let _guard = SERIAL.lock();
  let soon = || observable::timer(Duration::from_millis(10));
  let _ = observable::range(0, 3).merge_map(|_| slow()).take_until(soon()).subscribe().count();
  let _ = observable::of(vec![1, 2]).switch_map(|_| slow()).take_until(soon()).subscribe().count();
  let _ = observable::range(0, 4).merge_map(|v| observable::of(vec![v])).subscribe().count();
  assert_no_live_tasks();
}
