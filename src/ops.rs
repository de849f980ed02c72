//! Operator implementations.
//!
//! Every operator is a small `Observable` struct wrapping its upstream. Most
//! are plain pull adapters running on the consumer's thread; the join nodes,
//! `merge_map`, `switch_map`, `buffer`, `take_until` and `timeout` run helper
//! tasks in a
//! [`TaskScope`](crate::scheduler::TaskScope) owned by the subscription.

pub mod buffer;
pub mod buffer_count;
pub mod catch_error;
pub mod combine_latest;
pub mod concat;
pub mod concat_map;
pub mod default_if_empty;
pub mod delay;
pub mod distinct;
pub mod element_at;
pub mod filter;
pub mod first;
pub mod fork_join;
pub mod into_stream;
mod join;
pub mod map;
pub mod merge;
pub mod merge_map;
pub mod race;
pub mod reduce;
pub mod retry;
pub mod scan;
pub mod single;
pub mod skip;
pub mod start_with;
pub mod switch_map;
pub mod take;
pub mod take_until;
pub mod take_while;
pub mod tap;
pub mod timeout;
pub mod to_vec;
pub mod zip;

/// Chains operators left to right.
///
/// `pipe!(source, op1(a), op2(b))` expands to `source.op1(a).op2(b)`, so every
/// [`ObservableExt`](crate::observable::ObservableExt) combinator can be used
/// as a stage.
///
/// ```
/// use rxflow::{pipe, prelude::*};
///
/// let out: Vec<_> = pipe!(
///   observable::from_iter(1..=6),
///   filter(|v| v % 2 == 1),
///   map(|v| v * v),
/// )
/// .subscribe()
/// .flatten()
/// .collect();
/// assert_eq!(out, vec![1, 9, 25]);
/// ```
#[macro_export]
macro_rules! pipe {
  ($source:expr $(, $op:ident ( $($arg:expr),* $(,)? ) )* $(,)?) => {
    $source $( .$op( $($arg),* ) )*
  };
}
