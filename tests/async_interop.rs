//! Integration tests for the bridges between pull cursors and
//! `futures::Stream`.

use futures::{stream, StreamExt};
use rxflow::prelude::*;

#[tokio::test]
async fn operator_chain_into_stream() {
  let values: Vec<_> = observable::range(1, 10)
    .filter(|v| v % 3 == 0)
    .into_stream()
    .map(|item| item.unwrap())
    .collect()
    .await;
  assert_eq!(values, vec![3, 6, 9]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn join_operator_into_stream() {
  let mut values: Vec<_> = observable::merge(vec![
    observable::timer(Duration::from_millis(10)).box_it(),
    observable::interval(Duration::from_millis(3)).take(3).box_it(),
  ])
  .into_stream()
  .filter_map(|item| async move { item.ok() })
  .collect()
  .await;
  values.sort();
  assert_eq!(values, vec![0, 0, 1, 2]);
}

#[test]
fn stream_source_feeds_operators() {
  let out: Vec<_> = observable::from_stream(|| stream::iter(vec![1, 2, 3, 4]))
    .map(|v| v * 10)
    .skip(1)
    .subscribe()
    .collect::<rxflow::Result<_>>()
    .unwrap();
  assert_eq!(out, vec![20, 30, 40]);
}

#[tokio::test]
async fn stream_round_trip() {
  let source = observable::from_stream(|| stream::iter(0..5));
  let first: Vec<_> = source.into_stream().take(2).collect().await;
  assert_eq!(first.len(), 2);
  assert!(first.iter().all(Result::is_ok));
}

#[tokio::test]
async fn errors_end_the_stream() {
  let items: Vec<_> = observable::of(vec![1, 2])
    .concat_with(observable::throw_err(|| RxError::Empty))
    .into_stream()
    .collect()
    .await;
  assert_eq!(items.len(), 3);
  assert!(matches!(items[2], Err(RxError::Empty)));
}
