//! # rxflow: pull-driven Reactive Extensions for Rust
//!
//! Sequences are described by [`Observable`] blueprints and run by pulling
//! their [`Subscription`]s. Nothing is produced until the consumer asks for
//! it, so backpressure is the default rather than an operator.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxflow::prelude::*;
//!
//! let evens: Vec<_> = observable::range(0, 10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe()
//!   .collect::<rxflow::Result<_>>()
//!   .unwrap();
//! assert_eq!(evens, vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Stateless blueprint; every `subscribe` starts an independent run |
//! | [`Subscription`] | One live run, pulled as an `Iterator<Item = Result<T>>` |
//! | [`Observer`] | Push-style consumer driven by [`Subscription::drive`] |
//! | [`Subject`] | Hot multicast hub fed from the outside |
//! | [`TaskScope`] | Structured group of tasks used by concurrent operators |
//!
//! Join operators ([`merge`](observable::merge),
//! [`combine_latest`](observable::combine_latest), [`race`](observable::race),
//! [`fork_join`](observable::fork_join), [`concat`](observable::concat) and
//! [`zip`](observable::zip)) pull their sources concurrently inside a
//! [`TaskScope`]. Every task of a scope is cancelled and joined before the
//! subscription that started it is released.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subscription::drive`]: subscription::Subscription::drive
//! [`Subject`]: subject::Subject
//! [`TaskScope`]: scheduler::TaskScope

mod either;
pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscription;

pub use either::Either;
pub use error::{ErrorKind, Result, RxError};

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
