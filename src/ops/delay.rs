use std::sync::Arc;

use crate::{
  observable::Observable,
  scheduler::{self, Duration},
  subscription::Subscription,
};

/// Waits `duration` before the first pull of the source.
///
/// The source is subscribed only once the wait is over, so side effects of
/// subscribing are delayed too. Values after the first flow at the source's
/// own pace. A wait cut short by cancellation completes the run.
pub struct Delay<S> {
  source: Arc<S>,
  duration: Duration,
}

impl<S> Delay<S> {
  pub(crate) fn new(source: S, duration: Duration) -> Self {
    Delay { source: Arc::new(source), duration }
  }
}

impl<S> Observable for Delay<S>
where
  S: Observable + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let duration = self.duration;
    let mut pending = Some(self.source.clone());
    let mut upstream: Option<Subscription<S::Item>> = None;
    Subscription::new(std::iter::from_fn(move || {
      if let Some(source) = pending.take() {
        if !scheduler::sleep(duration) {
          return None;
        }
        upstream = Some(source.subscribe());
      }
      upstream.as_mut()?.next()
    }))
  }
}
