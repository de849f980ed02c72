use tracing::debug;

use super::join::{forward, Emission, FanIn};
use crate::{error::Result, observable::Observable, subscription::Subscription};

const SOURCE: usize = 0;

/// Mirrors the source until the notifier emits its first value.
///
/// Source and notifier are pulled concurrently. A notifier that completes
/// without emitting lets every source value through; a notifier error
/// terminates the run.
pub struct TakeUntil<S, N> {
  source: S,
  notifier: N,
}

impl<S, N> TakeUntil<S, N> {
  pub(crate) fn new(source: S, notifier: N) -> Self { TakeUntil { source, notifier } }
}

impl<S: Observable, N: Observable> Observable for TakeUntil<S, N> {
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    // `None` marks a notifier signal.
    let source = Subscription::new(self.source.subscribe().map(|item| item.map(Some)));
    let notifier = Subscription::new(self.notifier.subscribe().map(|item| item.map(|_| None)));
    Subscription::new(TakeUntilCursor { pending: Some(vec![source, notifier]), fan: None })
  }
}

struct TakeUntilCursor<T> {
  pending: Option<Vec<Subscription<Option<T>>>>,
  fan: Option<FanIn<Emission<Option<T>>>>,
}

impl<T: Send + 'static> TakeUntilCursor<T> {
  fn finish(&mut self) {
    if let Some(fan) = self.fan.take() {
      fan.finish();
    }
  }
}

impl<T: Send + 'static> Iterator for TakeUntilCursor<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Result<T>> {
    if let Some(sources) = self.pending.take() {
      match FanIn::start("take_until", sources, forward) {
        Ok(fan) => self.fan = Some(fan),
        Err(err) => return Some(Err(err)),
      }
    }

    loop {
      let emission = self.fan.as_ref()?.recv();
      match emission {
        Some(Emission::Next(_, Some(v))) => return Some(Ok(v)),
        Some(Emission::Next(_, None)) => {
          debug!("take_until notified");
          self.finish();
          return None;
        }
        Some(Emission::Error(_, err)) => {
          self.finish();
          return Some(Err(err));
        }
        Some(Emission::Complete(SOURCE)) | None => {
          self.finish();
          return None;
        }
        Some(Emission::Complete(_)) => {}
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{error::RxError, prelude::*};

  #[test]
  fn stops_at_first_notification() {
    let out: Vec<_> = observable::interval(Duration::from_millis(10))
      .take_until(observable::timer(Duration::from_millis(55)))
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert!(out.len() < 10);
    assert!(out.iter().copied().eq(0..out.len() as u64));
  }

  #[test]
  fn silent_notifier_lets_everything_through() {
    let out: Vec<_> = observable::of(vec![1, 2, 3])
      .take_until(observable::empty::<()>())
      .subscribe()
      .collect::<crate::error::Result<_>>()
      .unwrap();
    assert_eq!(out, vec![1, 2, 3]);
  }

  #[test]
  fn notifier_completes_a_silent_source() {
    let start = Instant::now();
    let mut sub = observable::never::<i32>()
      .take_until(observable::timer(Duration::from_millis(10)))
      .subscribe();
    assert!(sub.next().is_none());
    assert!(start.elapsed() < Duration::from_secs(5));
  }

  #[test]
  fn notifier_error_surfaces() {
    let mut sub = observable::never::<i32>()
      .take_until(observable::throw_err::<(), _>(|| RxError::msg("notifier failed")))
      .subscribe();
    let err = sub.next().unwrap().unwrap_err();
    assert_eq!(err.to_string(), "notifier failed");
    assert!(sub.next().is_none());
  }
}
