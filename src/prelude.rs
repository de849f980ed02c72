//! Prelude module for convenient imports
//!
//! `use rxflow::prelude::*;` brings the core traits, the source constructors
//! (through the `observable` module) and the scheduler primitives into scope.

// Core traits and types
pub use crate::observable::{self, BoxedObservable, Observable, ObservableExt};
pub use crate::observer::Observer;
pub use crate::subscription::Subscription;
// Errors and events
pub use crate::{
  either::Either,
  error::{ErrorKind, RxError},
  notification::Notification,
};
// Operator configuration
pub use crate::ops::retry::{RetryConfig, RetryPolicy};
// Scheduler
pub use crate::scheduler::{CancelToken, Duration, Instant, TaskScope};
// Subject
pub use crate::subject::{Subject, SubjectConfig};
