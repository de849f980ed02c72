//! Structured task groups.
//!
//! A [`TaskScope`] owns every thread it spawns. Dropping the scope cancels its
//! token and joins all tasks, so no task can outlive the subscription that
//! started it.

use std::{
  any::Any,
  fmt,
  panic,
  sync::atomic::{AtomicUsize, Ordering},
  thread::{self, JoinHandle},
};

use smallvec::SmallVec;
use tracing::{debug, error, trace};

use super::cancel::CancelToken;
use crate::error::RxError;

static LIVE_TASKS: AtomicUsize = AtomicUsize::new(0);

/// Number of scope tasks currently alive in this process.
///
/// Leak-detection tests assert this returns to zero once every subscription
/// has been drained or dropped.
pub fn live_tasks() -> usize { LIVE_TASKS.load(Ordering::SeqCst) }

/// Counts one task as alive for as long as it exists.
struct LiveTask;

impl LiveTask {
  fn new() -> Self {
    LIVE_TASKS.fetch_add(1, Ordering::SeqCst);
    LiveTask
  }
}

impl Drop for LiveTask {
  fn drop(&mut self) { LIVE_TASKS.fetch_sub(1, Ordering::SeqCst); }
}

/// Handle of one task inside a scope.
struct TaskHandle {
  token: CancelToken,
  handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
  fn join(&mut self) -> Option<Box<dyn Any + Send>> {
    self.handle.take().and_then(|handle| handle.join().err())
  }
}

/// A group of OS-thread tasks sharing one cancellation token.
///
/// Every task receives its own child token, so a single task can be stopped
/// (see [`TaskScope::cancel_task`]) while cancelling the scope stops all of
/// them.
pub struct TaskScope {
  name: &'static str,
  token: CancelToken,
  tasks: SmallVec<[TaskHandle; 4]>,
}

impl TaskScope {
  /// Creates a scope nested under the token of the calling thread.
  ///
  /// When the caller is itself a scope task, cancelling the caller's scope
  /// also cancels this one.
  pub fn new(name: &'static str) -> Self { Self::with_token(name, CancelToken::current().child()) }

  /// Creates a scope that is not linked to the calling thread's token.
  ///
  /// Used by long-lived producers such as a subject's run loop whose lifetime
  /// is independent of whichever consumer created them.
  pub fn detached(name: &'static str) -> Self { Self::with_token(name, CancelToken::new()) }

  fn with_token(name: &'static str, token: CancelToken) -> Self {
    TaskScope { name, token, tasks: SmallVec::new() }
  }

  #[inline]
  pub fn name(&self) -> &'static str { self.name }

  #[inline]
  pub fn token(&self) -> &CancelToken { &self.token }

  #[inline]
  pub fn len(&self) -> usize { self.tasks.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.token.is_cancelled() }

  /// Starts `task` on a new thread and returns its index within the scope.
  ///
  /// The task receives its own token, which is also installed as the thread's
  /// current token so nested scopes and timer waits observe cancellation.
  pub fn spawn<F>(&mut self, task: F) -> Result<usize, RxError>
  where
    F: FnOnce(CancelToken) + Send + 'static,
  {
    let index = self.tasks.len();
    let token = self.token.child();
    let task_token = token.clone();
    let live = LiveTask::new();
    let scope = self.name;

    let handle = thread::Builder::new()
      .name(format!("rxflow-{scope}-{index}"))
      .spawn(move || {
        let _live = live;
        let _enter = task_token.enter();
        trace!(scope, task = index, "task started");
        task(task_token);
        trace!(scope, task = index, "task finished");
      })
      .map_err(|err| RxError::Spawn(err.into()))?;

    self.tasks.push(TaskHandle { token, handle: Some(handle) });
    Ok(index)
  }

  /// Signals every task of the scope to stop.
  pub fn cancel(&self) {
    if self.token.cancel() {
      debug!(scope = self.name, tasks = self.tasks.len(), "scope cancelled");
    }
  }

  /// Signals only the task at `index` to stop.
  pub fn cancel_task(&self, index: usize) {
    if let Some(task) = self.tasks.get(index) {
      task.token.cancel();
    }
  }

  /// Cancels every task except the one at `index`.
  pub fn cancel_others(&self, index: usize) {
    self
      .tasks
      .iter()
      .enumerate()
      .filter(|(i, _)| *i != index)
      .for_each(|(_, task)| {
        task.token.cancel();
      });
  }

  /// Waits for every task to exit.
  ///
  /// A panic raised inside a task is resumed on the calling thread.
  pub fn join(&mut self) {
    let mut panicked = None;
    for task in self.tasks.iter_mut() {
      if let Some(payload) = task.join() {
        panicked.get_or_insert(payload);
      }
    }
    self.tasks.clear();
    if let Some(payload) = panicked {
      panic::resume_unwind(payload);
    }
  }

  /// Cancels the scope, then waits for every task to exit.
  pub fn shutdown(&mut self) {
    self.cancel();
    self.join();
  }

  /// Waits for every task to exit without cancelling them. Panics are logged
  /// rather than resumed, so this is safe to call from `Drop`.
  pub(crate) fn wait(&mut self) {
    for (index, task) in self.tasks.iter_mut().enumerate() {
      if task.join().is_some() {
        error!(scope = self.name, task = index, "task panicked during teardown");
      }
    }
    self.tasks.clear();
  }
}

impl Drop for TaskScope {
  fn drop(&mut self) {
    self.cancel();
    self.wait();
  }
}

impl fmt::Debug for TaskScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskScope")
      .field("name", &self.name)
      .field("tasks", &self.tasks.len())
      .field("cancelled", &self.token.is_cancelled())
      .finish()
  }
}
