//! Bridge from a pull cursor to `futures::Stream`.
//!
//! The subscription is pulled on a scoped task that feeds a one-slot async
//! channel, so an executor thread never blocks on the source. The task is
//! started on the first poll and joined when the stream is dropped.
//!
//! # Example
//!
//! ```
//! use futures::{executor::block_on, StreamExt};
//! use rxflow::prelude::*;
//!
//! let values: Vec<_> = block_on(observable::of(vec![1, 2, 3]).into_stream().collect());
//! assert_eq!(values.len(), 3);
//! ```

use std::{
  pin::Pin,
  task::{Context, Poll},
};

use futures::{channel::mpsc, executor::block_on, SinkExt, Stream};
use pin_project_lite::pin_project;
use tracing::trace;

use crate::{error::Result, scheduler::TaskScope, subscription::Subscription};

pin_project! {
  /// A `Stream` yielding the events of one subscription.
  ///
  /// Values arrive as `Ok`, a terminal error as a final `Err`, and completion
  /// as the end of the stream.
  pub struct IntoStream<T> {
    // Declared first so a parked forwarder fails fast on drop.
    #[pin]
    rx: Option<mpsc::Receiver<Result<T>>>,
    pending: Option<Subscription<T>>,
    scope: TaskScope,
  }
}

impl<T: Send + 'static> IntoStream<T> {
  pub(crate) fn new(subscription: Subscription<T>) -> Self {
    IntoStream { rx: None, pending: Some(subscription), scope: TaskScope::new("into_stream") }
  }
}

fn pump<T>(upstream: Subscription<T>, mut tx: mpsc::Sender<Result<T>>) {
  for item in upstream {
    if block_on(tx.send(item)).is_err() {
      trace!("stream dropped before the run ended");
      return;
    }
  }
}

impl<T: Send + 'static> Stream for IntoStream<T> {
  type Item = Result<T>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<T>>> {
    let mut this = self.project();
    if let Some(upstream) = this.pending.take() {
      let (tx, rx) = mpsc::channel(0);
      if let Err(err) = this.scope.spawn(move |_| pump(upstream, tx)) {
        return Poll::Ready(Some(Err(err)));
      }
      this.rx.set(Some(rx));
    }
    match this.rx.as_mut().as_pin_mut() {
      Some(rx) => rx.poll_next(cx),
      None => Poll::Ready(None),
    }
  }
}
