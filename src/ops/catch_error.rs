use std::sync::Arc;

use crate::{error::RxError, observable::Observable, subscription::Subscription};

/// On the first error, switches to the fallback observable built by the
/// handler.
///
/// The substitution happens once per run: an error raised by the fallback
/// terminates the run.
pub struct CatchError<S, H> {
  source: S,
  handler: Arc<H>,
}

impl<S, H> CatchError<S, H> {
  pub(crate) fn new(source: S, handler: H) -> Self {
    CatchError { source, handler: Arc::new(handler) }
  }
}

impl<S, H, O> Observable for CatchError<S, H>
where
  S: Observable,
  H: Fn(RxError) -> O + Send + Sync + 'static,
  O: Observable<Item = S::Item> + 'static,
{
  type Item = S::Item;

  fn subscribe(&self) -> Subscription<S::Item> {
    let handler = self.handler.clone();
    let mut upstream = self.source.subscribe();
    let mut recovered = false;
    Subscription::new(std::iter::from_fn(move || match upstream.next()? {
      Err(err) if !recovered => {
        recovered = true;
        upstream = handler(err).subscribe();
        upstream.next()
      }
      item => Some(item),
    }))
  }
}
