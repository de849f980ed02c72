//! Cooperative cancellation tokens.
//!
//! A [`CancelToken`] is a once-triggered stop signal. Tokens form a tree: a
//! child created with [`CancelToken::child`] is cancelled together with its
//! parent, but cancelling a child leaves the parent untouched.
//!
//! Besides the polling check [`CancelToken::is_cancelled`], every token exposes
//! a channel endpoint that becomes ready once the token fires, so blocking
//! hand-offs can `select!` over "value delivered" and "stop requested" at the
//! same time.

use std::{
  cell::RefCell,
  fmt,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
  },
  time::Duration,
};

use crossbeam_channel::{select, Receiver, Sender};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// The token of threads that run outside of any task scope. It never fires.
static ROOT: Lazy<CancelToken> = Lazy::new(|| CancelToken {
  inner: Arc::new(TokenInner {
    cancelled: AtomicBool::new(false),
    trigger: Mutex::new(None),
    signal: crossbeam_channel::never(),
    children: Mutex::new(Vec::new()),
    root: true,
  }),
});

thread_local! {
  static CURRENT: RefCell<Option<CancelToken>> = const { RefCell::new(None) };
}

struct TokenInner {
  cancelled: AtomicBool,
  // Never sends; dropping it disconnects `signal` and wakes every selector.
  trigger: Mutex<Option<Sender<()>>>,
  signal: Receiver<()>,
  children: Mutex<Vec<Weak<TokenInner>>>,
  root: bool,
}

/// A shareable, once-triggered stop signal.
#[derive(Clone)]
pub struct CancelToken {
  inner: Arc<TokenInner>,
}

impl CancelToken {
  /// Creates an independent token with no parent.
  pub fn new() -> Self {
    let (trigger, signal) = crossbeam_channel::bounded(0);
    CancelToken {
      inner: Arc::new(TokenInner {
        cancelled: AtomicBool::new(false),
        trigger: Mutex::new(Some(trigger)),
        signal,
        children: Mutex::new(Vec::new()),
        root: false,
      }),
    }
  }

  /// The token of the task running on the current thread.
  ///
  /// Threads that were not started by a [`TaskScope`](super::TaskScope) get a
  /// token that is never cancelled.
  pub fn current() -> Self {
    CURRENT.with(|current| current.borrow().clone()).unwrap_or_else(|| ROOT.clone())
  }

  /// Creates a token that is cancelled whenever `self` is.
  pub fn child(&self) -> Self {
    let child = CancelToken::new();
    if self.inner.root {
      return child;
    }

    // The children lock is held across the flag check, so a concurrent
    // `cancel` either sees this child or we see its flag.
    let mut children = self.inner.children.lock();
    if self.is_cancelled() {
      drop(children);
      child.cancel();
      return child;
    }
    children.retain(|weak| weak.strong_count() > 0);
    children.push(Arc::downgrade(&child.inner));
    child
  }

  /// Triggers the token and all of its descendants.
  ///
  /// Returns `true` if this call performed the transition.
  pub fn cancel(&self) -> bool {
    if self.inner.root || self.inner.cancelled.swap(true, Ordering::AcqRel) {
      return false;
    }
    drop(self.inner.trigger.lock().take());

    let children = std::mem::take(&mut *self.inner.children.lock());
    for child in children.iter().filter_map(Weak::upgrade) {
      CancelToken { inner: child }.cancel();
    }
    true
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.inner.cancelled.load(Ordering::Acquire) }

  /// A receiver that becomes ready (disconnected) once the token fires.
  ///
  /// Nothing is ever sent on it; use it as one arm of a `select!`.
  #[inline]
  pub fn cancelled(&self) -> &Receiver<()> { &self.inner.signal }

  /// Sleeps for `duration` unless the token fires first.
  ///
  /// Returns `false` when the sleep was cut short by cancellation.
  pub fn sleep(&self, duration: Duration) -> bool {
    if self.is_cancelled() {
      return false;
    }
    select! {
      recv(self.cancelled()) -> _ => false,
      default(duration) => true,
    }
  }

  /// Installs this token as the current token of the calling thread until the
  /// returned guard is dropped.
  pub(crate) fn enter(&self) -> EnterGuard {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(self.clone()));
    EnterGuard { previous }
  }
}

impl Default for CancelToken {
  fn default() -> Self { Self::new() }
}

impl fmt::Debug for CancelToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancelToken")
      .field("cancelled", &self.is_cancelled())
      .field("root", &self.inner.root)
      .finish()
  }
}

/// Restores the previously current token on drop.
pub(crate) struct EnterGuard {
  previous: Option<CancelToken>,
}

impl Drop for EnterGuard {
  fn drop(&mut self) {
    let previous = self.previous.take();
    CURRENT.with(|current| *current.borrow_mut() = previous);
  }
}
