//! Tabular document model.
//!
//! # Responsibility
//! - Define the entities of one loom document: columns, rows, cells, tags,
//!   sources, filters and table settings.
//! - Provide read-only lookup helpers that report missing entities as
//!   `NotFoundError`.
//!
//! # Invariants
//! - Every row holds exactly one cell per column, in column order.
//! - A cell payload variant always matches its owning column's `CellType`.
//! - Filters, tag references and source references never dangle.
//! - At most one column carries a non-`None` sort direction.
//!
//! Entities are plain values. Nothing in this module mutates a snapshot;
//! state transitions live in `crate::command`.

pub mod cell;
pub mod column;
pub mod error;
pub mod filter;
pub mod row;
pub mod snapshot;
pub mod source;
pub mod tag;

use chrono::Utc;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
