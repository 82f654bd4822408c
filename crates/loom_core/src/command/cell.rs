//! Cell payload replacement.
//!
//! # Invariants
//! - The payload variant must match the column type.
//! - Every cell edit stamps the owning row's `last_edited_time`; undo
//!   restores both the payload and the previous stamp.

use crate::command::error::{required, ArgumentsError, CommandError, CommandResult, UndoError};
use crate::command::Command;
use crate::model::cell::CellValue;
use crate::model::column::{Column, ColumnId};
use crate::model::error::NotFoundError;
use crate::model::now_millis;
use crate::model::row::RowId;
use crate::model::snapshot::Snapshot;
use serde::Deserialize;

/// Previous state of one edited cell.
#[derive(Debug, Clone)]
pub(crate) struct CellEdit {
    row_id: RowId,
    column_id: ColumnId,
    previous: CellValue,
    previous_edited_time: i64,
}

/// Replaces the payload of `(row_id, column_id)` with `edit(column, old)`.
///
/// Returns the next snapshot and the recorded edit.
pub(crate) fn edit_cell(
    snapshot: &Snapshot,
    row_id: RowId,
    column_id: ColumnId,
    edited_at: i64,
    edit: impl FnOnce(&Column, &CellValue) -> CommandResult<CellValue>,
) -> CommandResult<(Snapshot, CellEdit)> {
    let column = snapshot.column(column_id)?;
    let row_index = snapshot.row_index(row_id)?;
    let cell_index = snapshot.rows[row_index]
        .cell_index(column_id)
        .ok_or(NotFoundError::cell(column_id))?;
    let value = edit(column, &snapshot.rows[row_index].cells[cell_index].value)?;

    let mut next = snapshot.clone();
    let row = &mut next.rows[row_index];
    let previous = std::mem::replace(&mut row.cells[cell_index].value, value);
    let previous_edited_time = std::mem::replace(&mut row.last_edited_time, edited_at);

    Ok((
        next,
        CellEdit {
            row_id,
            column_id,
            previous,
            previous_edited_time,
        },
    ))
}

/// Restores the payload and row stamp recorded by `edit_cell`.
pub(crate) fn revert_cell(snapshot: &Snapshot, edit: &CellEdit) -> CommandResult<Snapshot> {
    let row_index = snapshot.row_index(edit.row_id)?;
    let cell_index = snapshot.rows[row_index]
        .cell_index(edit.column_id)
        .ok_or(NotFoundError::cell(edit.column_id))?;

    let mut next = snapshot.clone();
    let row = &mut next.rows[row_index];
    row.cells[cell_index].value = edit.previous.clone();
    row.last_edited_time = edit.previous_edited_time;
    Ok(next)
}

/// Rejects payloads that do not fit `column`, including unknown tag ids.
pub(crate) fn ensure_fits(column: &Column, value: &CellValue) -> CommandResult<()> {
    if value.kind() != column.kind {
        return Err(CommandError::TypeMismatch {
            column_id: column.id,
            expected: column.kind,
            actual: value.kind(),
        });
    }
    if let Some(tag_id) = value.tag_ids().iter().find(|id| column.tag(**id).is_none()) {
        return Err(NotFoundError::tag(*tag_id).into());
    }
    Ok(())
}

/// Arguments for `CellUpdateCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CellUpdateArgs {
    pub row_id: Option<RowId>,
    pub column_id: Option<ColumnId>,
    pub value: Option<CellValue>,
    /// Edit timestamp; defaults to the construction time.
    pub edited_at: Option<i64>,
}

/// Replaces one cell's payload.
#[derive(Debug, Clone)]
pub struct CellUpdateCommand {
    row_id: RowId,
    column_id: ColumnId,
    value: CellValue,
    edited_at: i64,
    edit: Option<CellEdit>,
}

impl CellUpdateCommand {
    pub const NAME: &'static str = "cell_update";

    pub fn new(args: CellUpdateArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            row_id: required(args.row_id, Self::NAME, "row_id")?,
            column_id: required(args.column_id, Self::NAME, "column_id")?,
            value: required(args.value, Self::NAME, "value")?,
            edited_at: args.edited_at.unwrap_or_else(now_millis),
            edit: None,
        })
    }
}

impl Command for CellUpdateCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let value = &self.value;
        let (next, edit) = edit_cell(
            snapshot,
            self.row_id,
            self.column_id,
            self.edited_at,
            |column, _| {
                ensure_fits(column, value)?;
                Ok(value.clone())
            },
        )?;

        self.edit = Some(edit);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let edit = self.edit.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let next = revert_cell(snapshot, edit)?;

        self.edit = None;
        Ok(next)
    }
}
