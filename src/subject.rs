//! Hot multicast hub.
//!
//! A [`Subject`] is fed from the outside through [`Subject::next`],
//! [`Subject::error`] and [`Subject::complete`], and broadcasts every event to
//! the listeners subscribed at that moment. All mutations (publishing,
//! registering and removing listeners) travel as commands over one queue to a
//! run loop on a dedicated task, which is the only owner of the listener set.
//!
//! ```
//! use std::thread;
//!
//! use rxflow::prelude::*;
//!
//! let subject = Subject::new();
//! let listener = subject.subscribe();
//! let feeder = subject.clone();
//! thread::spawn(move || {
//!   feeder.next(1);
//!   feeder.next(2);
//!   feeder.complete();
//! });
//! let values: Vec<i32> = listener.flatten().collect();
//! assert_eq!(values, vec![1, 2]);
//! ```

use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
  },
};

use crossbeam_channel::{select, Receiver, Sender};
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
  error::{Result, RxError},
  notification::Notification,
  observable::Observable,
  observer::Observer,
  scheduler::{CancelToken, TaskScope},
  subscription::Subscription,
};

// ===== Configuration =====

/// Tuning of a subject's run loop.
#[derive(Clone, Debug)]
pub struct SubjectConfig {
  name: &'static str,
  command_capacity: usize,
  listener_capacity: usize,
}

impl Default for SubjectConfig {
  fn default() -> Self {
    SubjectConfig { name: "subject", command_capacity: 16, listener_capacity: 16 }
  }
}

impl SubjectConfig {
  pub fn new() -> Self { Self::default() }

  /// Name of the run loop, used for its thread name and in log fields.
  pub fn name(mut self, name: &'static str) -> Self {
    self.name = name;
    self
  }

  /// Number of commands `next`, `subscribe` and listener drops may queue
  /// before the caller blocks.
  pub fn command_capacity(mut self, capacity: usize) -> Self {
    self.command_capacity = capacity;
    self
  }

  /// Number of events a listener may fall behind before the broadcast waits
  /// for it. Zero makes every delivery a rendezvous.
  pub fn listener_capacity(mut self, capacity: usize) -> Self {
    self.listener_capacity = capacity;
    self
  }
}

// ===== Run loop =====

enum Command<T> {
  Add(u64, Sender<Notification<T>>),
  Publish(Notification<T>),
}

type Listeners<T> = SmallVec<[(u64, Sender<Notification<T>>); 4]>;

fn run_loop<T: Clone>(
  name: &'static str,
  commands: Receiver<Command<T>>,
  removals: Receiver<u64>,
  token: CancelToken,
) {
  debug!(subject = name, "subject opened");
  let mut listeners: Listeners<T> = SmallVec::new();
  loop {
    let command = select! {
      recv(commands) -> command => match command {
        Ok(command) => command,
        Err(_) => break,
      },
      recv(removals) -> id => {
        if let Ok(id) = id {
          trace!(subject = name, listener = id, "listener removed");
          listeners.retain(|(listener, _)| *listener != id);
        }
        continue;
      }
      recv(token.cancelled()) -> _ => break,
    };
    match command {
      Command::Add(id, tx) => {
        trace!(subject = name, listener = id, "listener added");
        listeners.push((id, tx));
      }
      Command::Publish(note) => {
        let terminal = note.is_terminal();
        listeners.retain(|(_, tx)| deliver(tx, note.clone(), &token));
        if terminal {
          break;
        }
      }
    }
  }
  // Registrations still queued hold listener senders; dropping them completes
  // those listeners.
  let stranded = commands.try_iter().count();
  debug!(subject = name, listeners = listeners.len(), stranded, "subject run loop stopped");
}

/// Hands `note` to one listener; `false` if the listener is gone.
fn deliver<T>(tx: &Sender<Notification<T>>, note: Notification<T>, token: &CancelToken) -> bool {
  select! {
    send(tx, note) -> res => res.is_ok(),
    recv(token.cancelled()) -> _ => false,
  }
}

/// Owner of the run loop task.
///
/// Dropped after the command sender, so the loop sees the queue disconnect,
/// serves what is still queued and exits on its own.
struct RunLoop(Mutex<Option<TaskScope>>);

impl Drop for RunLoop {
  fn drop(&mut self) {
    if let Some(mut scope) = self.0.get_mut().take() {
      scope.wait();
    }
  }
}

// ===== Subject =====

struct Inner<T> {
  name: &'static str,
  commands: Sender<Command<T>>,
  removals: Sender<u64>,
  listener_capacity: usize,
  next_id: AtomicU64,
  // Set by the first terminal event or by `close`.
  closed: AtomicBool,
  // Declared last: fields drop in order.
  run_loop: RunLoop,
}

/// A hot, multicast producer.
///
/// Clones share the same run loop. Listeners only see events published after
/// their registration. When the last clone is dropped the run loop delivers
/// the events still queued and stops, and every listener completes; the drop
/// waits for that, so it is subject to the listeners' backpressure like any
/// publish.
///
/// To push a cold source into a subject, drive it into
/// [`Subject::observer`].
pub struct Subject<T> {
  inner: Arc<Inner<T>>,
}

impl<T> Clone for Subject<T> {
  fn clone(&self) -> Self { Subject { inner: self.inner.clone() } }
}

impl<T: Clone + Send + 'static> Subject<T> {
  /// Creates a subject with the default configuration.
  ///
  /// # Panics
  ///
  /// If the operating system refuses to start the run loop thread; see
  /// [`Subject::with_config`] for the fallible form.
  pub fn new() -> Self {
    match Self::with_config(SubjectConfig::default()) {
      Ok(subject) => subject,
      Err(err) => panic!("failed to start subject run loop: {err}"),
    }
  }

  pub fn with_config(config: SubjectConfig) -> Result<Self> {
    let (commands, command_rx) = crossbeam_channel::bounded(config.command_capacity);
    let (removals, removal_rx) = crossbeam_channel::unbounded();
    let mut scope = TaskScope::detached(config.name);
    let name = config.name;
    scope.spawn(move |token| run_loop(name, command_rx, removal_rx, token))?;
    Ok(Subject {
      inner: Arc::new(Inner {
        name,
        commands,
        removals,
        listener_capacity: config.listener_capacity,
        next_id: AtomicU64::new(0),
        closed: AtomicBool::new(false),
        run_loop: RunLoop(Mutex::new(Some(scope))),
      }),
    })
  }

  /// Broadcasts a value. No-op once the subject is closed.
  pub fn next(&self, value: T) {
    if self.is_closed() {
      return;
    }
    self.publish(Notification::Next(value));
  }

  /// Broadcasts a terminal error. Only the first terminal event is delivered.
  pub fn error(&self, err: RxError) {
    if !self.inner.closed.swap(true, Ordering::AcqRel) {
      self.publish(Notification::Error(err));
    }
  }

  /// Broadcasts completion. Only the first terminal event is delivered.
  pub fn complete(&self) {
    if !self.inner.closed.swap(true, Ordering::AcqRel) {
      self.publish(Notification::Complete);
    }
  }

  /// Registers a new listener.
  ///
  /// On a closed subject the returned subscription is already complete.
  pub fn subscribe(&self) -> Subscription<T> {
    if self.is_closed() {
      return Subscription::closed();
    }
    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
    let (tx, rx) = crossbeam_channel::bounded(self.inner.listener_capacity);
    if self.inner.commands.send(Command::Add(id, tx)).is_err() {
      warn!(subject = self.inner.name, listener = id, "registration dropped, run loop is gone");
      return Subscription::closed();
    }
    // Closed while registering: the run loop may stop before serving the
    // registration.
    if self.is_closed() {
      return Subscription::closed();
    }
    Subscription::new(Listener { id, rx, removals: self.inner.removals.clone() })
  }

  /// An [`Observer`] that publishes into this subject.
  pub fn observer(&self) -> SubjectObserver<T> { SubjectObserver(self.clone()) }

  fn publish(&self, note: Notification<T>) {
    if self.inner.commands.send(Command::Publish(note)).is_err() {
      trace!(subject = self.inner.name, "publish after the run loop stopped");
    }
  }
}

impl<T> Subject<T> {
  #[inline]
  pub fn is_closed(&self) -> bool { self.inner.closed.load(Ordering::Acquire) }

  /// Stops the run loop and disconnects every listener. Idempotent.
  ///
  /// Listeners that have not seen a terminal event observe a completion.
  /// Events still queued are discarded.
  pub fn close(&self) {
    self.inner.closed.store(true, Ordering::Release);
    let scope = self.inner.run_loop.0.lock().take();
    if let Some(mut scope) = scope {
      scope.shutdown();
      debug!(subject = self.inner.name, "subject closed");
    }
  }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
  fn default() -> Self { Self::new() }
}

impl<T> fmt::Debug for Subject<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subject")
      .field("name", &self.inner.name)
      .field("closed", &self.is_closed())
      .finish()
  }
}

impl<T: Clone + Send + 'static> Observable for Subject<T> {
  type Item = T;

  fn subscribe(&self) -> Subscription<T> { Subject::subscribe(self) }
}

/// The push end of a [`Subject`], returned by [`Subject::observer`].
pub struct SubjectObserver<T>(Subject<T>);

impl<T: Clone + Send + 'static> Observer<T> for SubjectObserver<T> {
  fn next(&mut self, value: T) { self.0.next(value) }

  fn error(self, err: RxError) { self.0.error(err) }

  fn complete(self) { self.0.complete() }

  fn is_closed(&self) -> bool { self.0.is_closed() }
}

// ===== Listener =====

/// The pull end of one registration.
struct Listener<T> {
  id: u64,
  rx: Receiver<Notification<T>>,
  removals: Sender<u64>,
}

impl<T> Iterator for Listener<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Result<T>> {
    let token = CancelToken::current();
    select! {
      recv(self.rx) -> note => note.ok()?.into_pull(),
      recv(token.cancelled()) -> _ => None,
    }
  }
}

impl<T> Drop for Listener<T> {
  fn drop(&mut self) {
    // Fails only once the run loop is gone, which has no listener to remove.
    let _ = self.removals.send(self.id);
  }
}

#[cfg(test)]
mod tests {
  use std::thread;

  use super::*;
  use crate::scheduler::Duration;

  #[test]
  fn listeners_see_events_after_registration() {
    let subject = Subject::new();
    subject.next(0);
    let listener = subject.subscribe();
    subject.next(1);
    subject.next(2);
    subject.complete();
    let out: Vec<i32> = listener.collect::<Result<_>>().unwrap();
    assert_eq!(out, vec![1, 2]);
  }

  #[test]
  fn every_listener_gets_the_broadcast() {
    let subject = Subject::new();
    let a = subject.subscribe();
    let b = subject.subscribe();
    let feeder = subject.clone();
    let handle = thread::spawn(move || {
      for i in 0..5 {
        feeder.next(i);
      }
      feeder.error(RxError::Timeout);
    });
    let a: Vec<_> = a.collect();
    let b: Vec<_> = b.collect();
    handle.join().unwrap();
    for out in [a, b] {
      assert_eq!(out.len(), 6);
      assert!(matches!(out[5], Err(RxError::Timeout)));
    }
  }

  #[test]
  fn terminal_event_is_emitted_once() {
    let subject = Subject::new();
    let listener = subject.subscribe();
    subject.complete();
    subject.error(RxError::Empty);
    subject.next(1);
    let out: Vec<i32> = listener.collect::<Result<_>>().unwrap();
    assert!(out.is_empty());
    assert!(subject.is_closed());
  }

  #[test]
  fn subscribe_after_close_is_complete() {
    let subject = Subject::<i32>::new();
    subject.close();
    subject.close();
    let mut listener = subject.subscribe();
    assert!(listener.is_closed());
    assert!(listener.next().is_none());
  }

  #[test]
  fn close_completes_pending_listeners() {
    let subject = Subject::<i32>::new();
    let mut listener = subject.subscribe();
    let closer = subject.clone();
    let handle = thread::spawn(move || {
      thread::sleep(Duration::from_millis(20));
      closer.close();
    });
    assert!(listener.next().is_none());
    handle.join().unwrap();
  }

  #[test]
  fn close_right_after_subscribe_completes_the_listener() {
    for _ in 0..20 {
      let subject = Subject::<i32>::new();
      let mut listener = subject.subscribe();
      subject.close();
      assert!(listener.next().is_none());
    }
  }

  #[test]
  fn dropping_the_last_handle_delivers_queued_events() {
    for _ in 0..50 {
      let subject = Subject::new();
      let listener = subject.subscribe();
      subject.next(1);
      subject.error(RxError::Timeout);
      drop(subject);
      let events: Vec<_> = listener.collect();
      assert_eq!(events.len(), 2);
      assert!(matches!(events[0], Ok(1)));
      assert!(matches!(events[1], Err(RxError::Timeout)));
    }
  }

  #[test]
  fn dropped_handle_completes_listeners_without_terminal_event() {
    let subject = Subject::new();
    let listener = subject.subscribe();
    subject.next("only");
    drop(subject);
    let out: Vec<&str> = listener.collect::<Result<_>>().unwrap();
    assert_eq!(out, vec!["only"]);
  }

  #[test]
  fn dropped_listener_does_not_stall_broadcast() {
    let subject = Subject::with_config(SubjectConfig::new().listener_capacity(0)).unwrap();
    let kept = subject.subscribe();
    drop(subject.subscribe());
    let feeder = subject.clone();
    let handle = thread::spawn(move || {
      feeder.next(7);
      feeder.complete();
    });
    let out: Vec<i32> = kept.collect::<Result<_>>().unwrap();
    handle.join().unwrap();
    assert_eq!(out, vec![7]);
  }

  #[test]
  fn subject_multicasts_a_cold_source() {
    let subject = Subject::new();
    let listener = subject.subscribe();
    let source = crate::observable::of(vec![1, 2, 3]);
    let feeder = subject.clone();
    let handle = thread::spawn(move || source.subscribe().drive(feeder.observer()));
    let out: Vec<i32> = listener.collect::<Result<_>>().unwrap();
    handle.join().unwrap();
    assert_eq!(out, vec![1, 2, 3]);
  }
}
