//! Materialized events of a sequence.

use crate::error::{Result, RxError};

/// One event of a sequence run, as carried over a channel.
#[derive(Debug, Clone)]
pub enum Notification<T> {
  Next(T),
  Error(RxError),
  Complete,
}

impl<T> Notification<T> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Converts into the tri-state shape returned by a pull cursor.
  pub fn into_pull(self) -> Option<Result<T>> {
    match self {
      Notification::Next(v) => Some(Ok(v)),
      Notification::Error(err) => Some(Err(err)),
      Notification::Complete => None,
    }
  }
}
