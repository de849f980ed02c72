//! Error types surfaced through the value channel of a sequence.
//!
//! Every failing run ends with exactly one [`RxError`]. The structural
//! variants are raised by the engine's own operators (for example `first` on an
//! empty source or `timeout` on a silent one); anything produced by user code
//! travels as [`RxError::User`].

use std::{error::Error as StdError, fmt, sync::Arc};

use thiserror::Error;

/// Result alias used by every pull cursor in the crate.
pub type Result<T> = std::result::Result<T, RxError>;

/// The error carried by a terminal error event.
///
/// `RxError` is cheap to clone: a [`Subject`](crate::subject::Subject)
/// broadcasts one error to every listener, and user errors are shared behind
/// an `Arc`.
#[derive(Debug, Clone, Error)]
pub enum RxError {
  /// The sequence completed without the value an operator required.
  #[error("rxflow: empty value")]
  Empty,

  /// No value matched the predicate before the sequence completed.
  #[error("rxflow: no values match")]
  NotFound,

  /// The sequence did not emit within the allotted time.
  #[error("rxflow: timeout")]
  Timeout,

  /// The requested index lies beyond the end of the sequence.
  #[error("rxflow: out of range")]
  OutOfRange,

  /// More values matched than the operator allows.
  #[error("rxflow: too many values match")]
  Sequence,

  /// The operating system refused to start a task thread.
  #[error("rxflow: failed to spawn task: {0}")]
  Spawn(Arc<std::io::Error>),

  /// An error produced by a source, a predicate or a projection.
  #[error(transparent)]
  User(Arc<dyn StdError + Send + Sync>),
}

/// Exhaustive, comparable classification of an [`RxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  Empty,
  NotFound,
  Timeout,
  OutOfRange,
  Sequence,
  Spawn,
  User,
}

impl RxError {
  /// Wraps an arbitrary error value as a user error.
  pub fn user<E>(err: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    RxError::User(Arc::new(err))
  }

  /// Builds a user error from a plain message.
  pub fn msg(message: impl Into<String>) -> Self {
    let boxed: Box<dyn StdError + Send + Sync> = message.into().into();
    RxError::User(Arc::from(boxed))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      RxError::Empty => ErrorKind::Empty,
      RxError::NotFound => ErrorKind::NotFound,
      RxError::Timeout => ErrorKind::Timeout,
      RxError::OutOfRange => ErrorKind::OutOfRange,
      RxError::Sequence => ErrorKind::Sequence,
      RxError::Spawn(_) => ErrorKind::Spawn,
      RxError::User(_) => ErrorKind::User,
    }
  }

  /// `true` for the sentinel errors defined by the engine itself.
  pub fn is_structural(&self) -> bool { !matches!(self, RxError::User(_) | RxError::Spawn(_)) }

  /// Attempts to recover the concrete type of a user error.
  pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
    match self {
      RxError::User(inner) => inner.downcast_ref::<E>(),
      _ => None,
    }
  }
}

impl From<std::io::Error> for RxError {
  fn from(err: std::io::Error) -> Self { RxError::user(err) }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ErrorKind::Empty => "empty",
      ErrorKind::NotFound => "not-found",
      ErrorKind::Timeout => "timeout",
      ErrorKind::OutOfRange => "out-of-range",
      ErrorKind::Sequence => "too-many-matches",
      ErrorKind::Spawn => "spawn",
      ErrorKind::User => "user",
    };
    f.write_str(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("disk on fire")]
  struct DiskOnFire;

  #[test]
  fn sentinel_messages() {
    assert_eq!(RxError::Empty.to_string(), "rxflow: empty value");
    assert_eq!(RxError::Timeout.to_string(), "rxflow: timeout");
    assert_eq!(RxError::Sequence.kind(), ErrorKind::Sequence);
    assert!(RxError::OutOfRange.is_structural());
  }

  #[test]
  fn user_errors_keep_their_type() {
    let err = RxError::user(DiskOnFire);
    assert_eq!(err.kind(), ErrorKind::User);
    assert!(!err.is_structural());
    assert!(err.downcast_ref::<DiskOnFire>().is_some());
    assert_eq!(err.clone().to_string(), "disk on fire");
  }

  #[test]
  fn message_errors_display_verbatim() {
    let err = RxError::msg("stop la");
    assert_eq!(err.to_string(), "stop la");
    assert_eq!(err.kind().to_string(), "user");
  }
}
