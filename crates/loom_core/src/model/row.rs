//! Row records.
//!
//! # Invariants
//! - `cells` holds exactly one cell per table column, in column order.
//! - `source_id` is a back-reference only; rows are never owned by a source.
//! - `last_edited_time >= creation_time` for rows created by this crate.

use crate::model::cell::Cell;
use crate::model::column::ColumnId;
use crate::model::source::SourceId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable row identifier.
pub type RowId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    /// Unix epoch milliseconds.
    pub creation_time: i64,
    /// Unix epoch milliseconds of the last cell edit.
    pub last_edited_time: i64,
    pub source_id: Option<SourceId>,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Creates a row with a generated id, created and edited at `now`.
    pub fn new(cells: Vec<Cell>, now: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            creation_time: now,
            last_edited_time: now,
            source_id: None,
            cells,
        }
    }

    pub fn cell(&self, column_id: ColumnId) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.column_id == column_id)
    }

    pub fn cell_index(&self, column_id: ColumnId) -> Option<usize> {
        self.cells.iter().position(|cell| cell.column_id == column_id)
    }
}
