//! Read-only derived views over a snapshot.
//!
//! # Responsibility
//! - Decide which rows pass the enabled filters and free-text search.
//! - Order rows by the sorted column.
//! - Compute calculation-row aggregates.
//!
//! # Invariants
//! - Views never mutate the snapshot and never fail on data they cannot
//!   compare; unknown combinations are permissive.
//! - Row order is stable for ties.

pub mod calculation;
pub mod filter;
pub mod sort;

pub use calculation::{calculate, CalculationValue};
pub use filter::{filtered_rows, matches, search_rows};
pub use sort::{sort_rows, sorted_rows};
