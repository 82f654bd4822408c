//! Document snapshot: the unit of undo/redo.
//!
//! # Responsibility
//! - Aggregate every entity collection of one loom document.
//! - Resolve ids to entities for commands and derived views.
//! - Verify cross-entity invariants on demand.
//!
//! # Invariants
//! - A snapshot handed out by a command or the history is never mutated
//!   afterwards; commands clone and return a new value.
//! - See `crate::model` for the entity invariants checked by
//!   `check_integrity`.

use crate::model::cell::Cell;
use crate::model::column::{CellType, Column, ColumnId};
use crate::model::error::{EntityKind, IntegrityError, NotFoundError};
use crate::model::filter::{Filter, FilterId};
use crate::model::now_millis;
use crate::model::row::{Row, RowId};
use crate::model::source::{Source, SourceId};
use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Leading columns frozen in new tables.
pub const DEFAULT_FROZEN_COLUMNS: usize = 1;

/// Table-level display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Count of leading columns pinned while scrolling. Display only.
    pub num_frozen_columns: usize,
    pub show_calculation_row: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_frozen_columns: DEFAULT_FROZEN_COLUMNS,
            show_calculation_row: true,
        }
    }
}

/// One immutable state of a whole document.
///
/// The active sort is the column whose `sort_dir` is not `None`; it is not
/// duplicated in `settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub sources: Vec<Source>,
    pub filters: Vec<Filter>,
    pub settings: Settings,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Creates the smallest valid table: one text column, one row.
    pub fn new() -> Self {
        Self::with_dimensions(1, 1)
    }

    /// Creates a table of text columns named `Column 1..=n` and empty rows.
    ///
    /// `num_columns` is raised to 1, a table always keeps one column.
    pub fn with_dimensions(num_columns: usize, num_rows: usize) -> Self {
        let columns: Vec<Column> = (1..=num_columns.max(1))
            .map(|position| Column::new(CellType::Text, format!("Column {position}")))
            .collect();
        let now = now_millis();
        let rows = (0..num_rows)
            .map(|_| Row::new(columns.iter().map(Cell::default_for).collect(), now))
            .collect();
        Self {
            columns,
            rows,
            sources: Vec::new(),
            filters: Vec::new(),
            settings: Settings::default(),
        }
    }

    pub fn column(&self, column_id: ColumnId) -> Result<&Column, NotFoundError> {
        self.columns
            .iter()
            .find(|column| column.id == column_id)
            .ok_or(NotFoundError::column(column_id))
    }

    pub fn column_index(&self, column_id: ColumnId) -> Result<usize, NotFoundError> {
        self.columns
            .iter()
            .position(|column| column.id == column_id)
            .ok_or(NotFoundError::column(column_id))
    }

    pub fn row(&self, row_id: RowId) -> Result<&Row, NotFoundError> {
        self.rows
            .iter()
            .find(|row| row.id == row_id)
            .ok_or(NotFoundError::row(row_id))
    }

    pub fn row_index(&self, row_id: RowId) -> Result<usize, NotFoundError> {
        self.rows
            .iter()
            .position(|row| row.id == row_id)
            .ok_or(NotFoundError::row(row_id))
    }

    /// Finds the cell of `row_id` that belongs to `column_id`.
    ///
    /// A missing row reports the row id; a row without a cell for the column
    /// reports the column id as a missing cell.
    pub fn cell(&self, row_id: RowId, column_id: ColumnId) -> Result<&Cell, NotFoundError> {
        self.row(row_id)?
            .cell(column_id)
            .ok_or(NotFoundError::cell(column_id))
    }

    pub fn tag(&self, column_id: ColumnId, tag_id: TagId) -> Result<&Tag, NotFoundError> {
        self.column(column_id)?
            .tag(tag_id)
            .ok_or(NotFoundError::tag(tag_id))
    }

    pub fn filter(&self, filter_id: FilterId) -> Result<&Filter, NotFoundError> {
        self.filters
            .iter()
            .find(|filter| filter.id == filter_id)
            .ok_or(NotFoundError::filter(filter_id))
    }

    pub fn filter_index(&self, filter_id: FilterId) -> Result<usize, NotFoundError> {
        self.filters
            .iter()
            .position(|filter| filter.id == filter_id)
            .ok_or(NotFoundError::filter(filter_id))
    }

    pub fn source(&self, source_id: SourceId) -> Result<&Source, NotFoundError> {
        self.sources
            .iter()
            .find(|source| source.id == source_id)
            .ok_or(NotFoundError::source(source_id))
    }

    /// Column currently driving the sort, if any.
    pub fn sort_column(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.is_sorted())
    }

    /// Verifies every cross-entity invariant of the document.
    ///
    /// Returns the first violation found.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        if self.columns.is_empty() {
            return Err(IntegrityError::NoColumns);
        }
        ensure_unique(EntityKind::Column, self.columns.iter().map(|c| c.id))?;
        ensure_unique(EntityKind::Row, self.rows.iter().map(|r| r.id))?;
        ensure_unique(EntityKind::Filter, self.filters.iter().map(|f| f.id))?;
        ensure_unique(EntityKind::Source, self.sources.iter().map(|s| s.id))?;
        ensure_unique(
            EntityKind::Cell,
            self.rows.iter().flat_map(|r| r.cells.iter().map(|c| c.id)),
        )?;
        for column in &self.columns {
            ensure_unique(EntityKind::Tag, column.tags.iter().map(|t| t.id))?;
        }

        if self.columns.iter().filter(|c| c.is_sorted()).count() > 1 {
            return Err(IntegrityError::MultipleSortColumns);
        }

        for row in &self.rows {
            if row.cells.len() != self.columns.len() {
                return Err(IntegrityError::CellCountMismatch {
                    row_id: row.id,
                    expected: self.columns.len(),
                    actual: row.cells.len(),
                });
            }
            for (index, (column, cell)) in self.columns.iter().zip(&row.cells).enumerate() {
                if cell.column_id != column.id {
                    return Err(IntegrityError::CellColumnMismatch {
                        row_id: row.id,
                        index,
                    });
                }
                if cell.value.kind() != column.kind {
                    return Err(IntegrityError::CellKindMismatch {
                        row_id: row.id,
                        column_id: column.id,
                    });
                }
                if let Some(tag_id) = cell
                    .value
                    .tag_ids()
                    .iter()
                    .find(|tag_id| column.tag(**tag_id).is_none())
                {
                    return Err(IntegrityError::DanglingTag {
                        row_id: row.id,
                        tag_id: *tag_id,
                    });
                }
            }
            if let Some(source_id) = row.source_id {
                if self.source(source_id).is_err() {
                    return Err(IntegrityError::DanglingSource {
                        row_id: row.id,
                        source_id,
                    });
                }
            }
        }

        for filter in &self.filters {
            if self.column(filter.column_id).is_err() {
                return Err(IntegrityError::DanglingFilter {
                    filter_id: filter.id,
                    column_id: filter.column_id,
                });
            }
        }

        Ok(())
    }
}

fn ensure_unique(
    kind: EntityKind,
    ids: impl Iterator<Item = Uuid>,
) -> Result<(), IntegrityError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(IntegrityError::DuplicateId { kind, id });
        }
    }
    Ok(())
}
