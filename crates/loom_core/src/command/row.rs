//! Row structure commands: add (append or insert), delete, reorder.

use crate::command::error::{required, ArgumentsError, CommandResult, UndoError};
use crate::command::{move_item, Command, Target};
use crate::model::cell::Cell;
use crate::model::now_millis;
use crate::model::row::{Row, RowId};
use crate::model::snapshot::Snapshot;
use crate::model::source::SourceId;
use serde::Deserialize;

/// Arguments for `RowAddCommand`.
///
/// With neither `above` nor `below` the row is appended.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RowAddArgs {
    /// Insert directly above this row.
    pub above: Option<RowId>,
    /// Insert directly below this row.
    pub below: Option<RowId>,
    pub source_id: Option<SourceId>,
    /// Creation timestamp; defaults to the construction time.
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
enum RowPosition {
    End,
    Above(RowId),
    Below(RowId),
}

/// Adds a row holding one default cell per column.
#[derive(Debug, Clone)]
pub struct RowAddCommand {
    position: RowPosition,
    source_id: Option<SourceId>,
    created_at: i64,
    /// Row built by the first execution, reused on redo.
    row: Option<Row>,
    added_at: Option<usize>,
}

impl RowAddCommand {
    pub const NAME: &'static str = "row_add";

    pub fn new(args: RowAddArgs) -> Result<Self, ArgumentsError> {
        let position = match (args.above, args.below) {
            (Some(_), Some(_)) => {
                return Err(ArgumentsError::Conflict {
                    command: Self::NAME,
                    fields: "above, below",
                })
            }
            (Some(row_id), None) => RowPosition::Above(row_id),
            (None, Some(row_id)) => RowPosition::Below(row_id),
            (None, None) => RowPosition::End,
        };
        Ok(Self {
            position,
            source_id: args.source_id,
            created_at: args.created_at.unwrap_or_else(now_millis),
            row: None,
            added_at: None,
        })
    }

    /// Id of the added row, available after the first `execute`.
    pub fn row_id(&self) -> Option<RowId> {
        self.row.as_ref().map(|row| row.id)
    }
}

impl Command for RowAddCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = match self.position {
            RowPosition::End => snapshot.rows.len(),
            RowPosition::Above(row_id) => snapshot.row_index(row_id)?,
            RowPosition::Below(row_id) => snapshot.row_index(row_id)? + 1,
        };
        if let Some(source_id) = self.source_id {
            snapshot.source(source_id)?;
        }

        let row = match self.row.clone() {
            Some(row) => row,
            None => {
                let cells = snapshot.columns.iter().map(Cell::default_for).collect();
                let mut row = Row::new(cells, self.created_at);
                row.source_id = self.source_id;
                self.row = Some(row.clone());
                row
            }
        };
        let mut next = snapshot.clone();
        next.rows.insert(index, row);

        self.added_at = Some(index);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        self.added_at.ok_or(UndoError::new(Self::NAME))?;
        let row_id = self
            .row
            .as_ref()
            .map(|row| row.id)
            .ok_or(UndoError::new(Self::NAME))?;
        let index = snapshot.row_index(row_id)?;
        let mut next = snapshot.clone();
        next.rows.remove(index);

        self.added_at = None;
        Ok(next)
    }
}

/// Arguments for `RowDeleteCommand`: exactly one of `id` or `last`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RowDeleteArgs {
    pub id: Option<RowId>,
    pub last: bool,
}

/// Deletes one row. Undo reinserts it at its original index.
///
/// `{last: true}` on an empty table is a no-op.
#[derive(Debug, Clone)]
pub struct RowDeleteCommand {
    target: Target<RowId>,
    /// `Some(None)` records an executed no-op.
    deleted: Option<Option<(usize, Row)>>,
}

impl RowDeleteCommand {
    pub const NAME: &'static str = "row_delete";

    pub fn new(args: RowDeleteArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            target: Target::from_args(args.id, args.last, Self::NAME)?,
            deleted: None,
        })
    }
}

impl Command for RowDeleteCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = match self.target {
            Target::Id(row_id) => Some(snapshot.row_index(row_id)?),
            Target::Last => snapshot.rows.len().checked_sub(1),
        };
        let Some(index) = index else {
            self.deleted = Some(None);
            return Ok(snapshot.clone());
        };

        let mut next = snapshot.clone();
        let row = next.rows.remove(index);

        self.deleted = Some(Some((index, row)));
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let deleted = self.deleted.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        if let Some((index, row)) = deleted {
            next.rows.insert((*index).min(next.rows.len()), row.clone());
        }

        self.deleted = None;
        Ok(next)
    }
}

/// Arguments for `RowReorderCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RowReorderArgs {
    pub id: Option<RowId>,
    /// Destination index; indices past the end clamp to the last position.
    pub to_index: Option<usize>,
}

/// Moves one row to a new index.
#[derive(Debug, Clone)]
pub struct RowReorderCommand {
    row_id: RowId,
    to_index: usize,
    moved: Option<(usize, usize)>,
}

impl RowReorderCommand {
    pub const NAME: &'static str = "row_reorder";

    pub fn new(args: RowReorderArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            row_id: required(args.id, Self::NAME, "id")?,
            to_index: required(args.to_index, Self::NAME, "to_index")?,
            moved: None,
        })
    }
}

impl Command for RowReorderCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let from = snapshot.row_index(self.row_id)?;
        let mut next = snapshot.clone();
        let to = move_item(&mut next.rows, from, self.to_index);

        self.moved = Some((from, to));
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let (from, to) = self.moved.ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        move_item(&mut next.rows, to, from);

        self.moved = None;
        Ok(next)
    }
}
