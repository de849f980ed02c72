//! A two-way sum type used to run sources of different item types through a
//! single join node.

/// A value from the left or the right source of a binary join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
  Left(L),
  Right(R),
}

impl<L, R> Either<L, R> {
  /// Splits a two-source join row (left at index 0, right at index 1) into a
  /// tuple.
  ///
  /// # Panics
  ///
  /// If the row does not hold a left then a right value. Join nodes emit rows
  /// in source order, so a binary join always satisfies this.
  pub(crate) fn into_pair(row: Vec<Either<L, R>>) -> (L, R) {
    let mut row = row.into_iter();
    match (row.next(), row.next()) {
      (Some(Either::Left(l)), Some(Either::Right(r))) => (l, r),
      _ => unreachable!("binary join rows are ordered left, right"),
    }
  }
}
