use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::RwLock;

use super::join::{forward, hand_off, Emission, FanIn};
use crate::{
  error::Result, observable::Observable, scheduler::CancelToken, subscription::Subscription,
};

const SOURCE: usize = 0;
const NOTIFIER: usize = 1;

/// Collects source values and emits them as a batch every time the notifier
/// emits.
///
/// The source is drained by its own task into a shared buffer, independently
/// of the consumer's pace. Each notifier value emits the current buffer (which
/// may be empty) and starts a new one. When either the source or the notifier
/// completes, whatever is still buffered is emitted if non-empty and the run
/// completes. An error from either side terminates the run.
pub struct Buffer<S, N> {
  source: S,
  notifier: N,
}

impl<S, N> Buffer<S, N> {
  pub(crate) fn new(source: S, notifier: N) -> Self { Buffer { source, notifier } }
}

impl<S, N> Observable for Buffer<S, N>
where
  S: Observable,
  S::Item: Sync,
  N: Observable,
{
  type Item = Vec<S::Item>;

  fn subscribe(&self) -> Subscription<Vec<S::Item>> {
    let ticks = Subscription::new(self.notifier.subscribe().map(|item| item.map(|_| ())));
    Subscription::new(BufferCursor {
      pending: Some((self.source.subscribe(), ticks)),
      fan: None,
      buffer: Arc::new(RwLock::new(Vec::new())),
    })
  }
}

/// Appends every source value to `buffer`; only the terminal event is handed
/// to the consumer.
fn gather<T>(
  upstream: Subscription<T>,
  buffer: Arc<RwLock<Vec<T>>>,
  tx: Sender<Emission<()>>,
  token: CancelToken,
) {
  for item in upstream {
    if token.is_cancelled() {
      return;
    }
    match item {
      Ok(v) => buffer.write().push(v),
      Err(err) => {
        hand_off(&tx, Emission::Error(SOURCE, err), &token);
        return;
      }
    }
  }
  hand_off(&tx, Emission::Complete(SOURCE), &token);
}

struct BufferCursor<T> {
  pending: Option<(Subscription<T>, Subscription<()>)>,
  fan: Option<FanIn<Emission<()>>>,
  buffer: Arc<RwLock<Vec<T>>>,
}

impl<T: Send + Sync + 'static> BufferCursor<T> {
  fn start(&mut self, source: Subscription<T>, ticks: Subscription<()>) -> Result<()> {
    let (mut fan, tx) = FanIn::new("buffer");
    let buffer = self.buffer.clone();
    let source_tx = tx.clone();
    fan.spawn(move |token| gather(source, buffer, source_tx, token))?;
    fan.spawn(move |token| forward(NOTIFIER, ticks, tx, token))?;
    self.fan = Some(fan);
    Ok(())
  }

  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }

  fn flush(&self) -> Vec<T> { std::mem::take(&mut *self.buffer.write()) }
}

impl<T: Send + Sync + 'static> Iterator for BufferCursor<T> {
  type Item = Result<Vec<T>>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some((source, ticks)) = self.pending.take() {
      if let Err(err) = self.start(source, ticks) {
        self.finish();
        return Some(Err(err));
      }
    }

    let emission = self.fan.as_ref()?.recv();
    match emission {
      Some(Emission::Next(..)) => Some(Ok(self.flush())),
      Some(Emission::Error(_, err)) => {
        self.finish();
        Some(Err(err))
      }
      Some(Emission::Complete(_)) | None => {
        self.finish();
        let rest = self.flush();
        (!rest.is_empty()).then_some(Ok(rest))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::thread;

  use crate::{error::RxError, prelude::*};

  #[test]
  fn source_completion_flushes_the_rest() {
    let out: Vec<_> = observable::of(vec![1, 2, 3, 4])
      .buffer(observable::never::<()>())
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![vec![1, 2, 3, 4]]);
  }

  #[test]
  fn every_tick_emits_a_batch() {
    let (src_tx, src_rx) = crossbeam_channel::unbounded();
    let (tick_tx, tick_rx) = crossbeam_channel::unbounded();
    src_tx.send(1).unwrap();
    src_tx.send(2).unwrap();

    let feeder = thread::spawn(move || {
      let pause = || thread::sleep(Duration::from_millis(50));
      pause();
      tick_tx.send(()).unwrap();
      pause();
      src_tx.send(3).unwrap();
      pause();
      tick_tx.send(()).unwrap();
      pause();
      tick_tx.send(()).unwrap();
      pause();
      drop(src_tx);
      pause();
    });

    let out: Vec<_> = observable::from_channel(src_rx)
      .buffer(observable::from_channel(tick_rx))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    feeder.join().unwrap();
    assert_eq!(out, vec![vec![1, 2], vec![3], vec![]]);
  }

  #[test]
  fn notifier_completion_ends_the_run() {
    let out: Vec<_> = observable::never::<i32>()
      .buffer(observable::timer(Duration::from_millis(10)))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![Vec::<i32>::new()]);
  }

  #[test]
  fn source_error_surfaces() {
    let mut sub = observable::throw_err::<i32, _>(|| RxError::OutOfRange)
      .buffer(observable::never::<()>())
      .subscribe();
    assert!(matches!(sub.next(), Some(Err(RxError::OutOfRange))));
    assert!(sub.next().is_none());
  }

  #[test]
  fn buffer_time_emits_empty_batches_on_schedule() {
    let out: Vec<_> = observable::never::<i32>()
      .buffer_time(Duration::from_millis(5))
      .take(3)
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![Vec::<i32>::new(); 3]);
  }

  #[test]
  fn buffer_time_keeps_every_value_in_order() {
    let batches: Vec<Vec<u64>> = observable::interval(Duration::from_millis(2))
      .take(10)
      .buffer_time(Duration::from_millis(7))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    let values: Vec<_> = batches.into_iter().flatten().collect();
    assert_eq!(values, (0..10).collect::<Vec<_>>());
  }
}
