//! Column structure commands: add, delete, reorder, property update, sort.

use crate::command::error::{required, ArgumentsError, CommandResult, UndoError};
use crate::command::{move_item, Command, Target};
use crate::model::cell::{Cell, CellId, CellValue};
use crate::model::column::{
    CalculationType, CellType, Column, ColumnId, CurrencyType, DateFormat, NumberFormat, SortDir,
    DEFAULT_COLUMN_NAME,
};
use crate::model::error::NotFoundError;
use crate::model::filter::Filter;
use crate::model::row::RowId;
use crate::model::snapshot::Snapshot;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Arguments for `ColumnAddCommand`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnAddArgs {
    /// Insert position; defaults to the end. Clamped to the column count.
    pub insert_at: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<CellType>,
    pub name: Option<String>,
}

/// Adds a column and one default cell per row at the same index.
#[derive(Debug, Clone)]
pub struct ColumnAddCommand {
    insert_at: Option<usize>,
    kind: CellType,
    name: String,
    column_id: ColumnId,
    cell_ids: Vec<CellId>,
    added_at: Option<usize>,
}

impl ColumnAddCommand {
    pub const NAME: &'static str = "column_add";

    pub fn new(args: ColumnAddArgs) -> Self {
        Self {
            insert_at: args.insert_at,
            kind: args.kind.unwrap_or_default(),
            name: args.name.unwrap_or_else(|| DEFAULT_COLUMN_NAME.to_string()),
            column_id: Uuid::new_v4(),
            cell_ids: Vec::new(),
            added_at: None,
        }
    }

    /// Id of the column this command creates.
    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }
}

impl Command for ColumnAddCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let mut next = snapshot.clone();
        let index = self
            .insert_at
            .map_or(next.columns.len(), |at| at.min(next.columns.len()));
        let column = Column::with_id(self.column_id, self.kind, self.name.clone());

        for (position, row) in next.rows.iter_mut().enumerate() {
            let cell_id = match self.cell_ids.get(position) {
                Some(cell_id) => *cell_id,
                None => {
                    let cell_id = Uuid::new_v4();
                    self.cell_ids.push(cell_id);
                    cell_id
                }
            };
            row.cells.insert(
                index,
                Cell {
                    id: cell_id,
                    column_id: column.id,
                    value: CellValue::default_for(column.kind),
                },
            );
        }
        next.columns.insert(index, column);

        self.added_at = Some(index);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        self.added_at.ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        let index = next.column_index(self.column_id)?;
        next.columns.remove(index);
        for row in &mut next.rows {
            row.cells.retain(|cell| cell.column_id != self.column_id);
        }

        self.added_at = None;
        Ok(next)
    }
}

/// Arguments for `ColumnDeleteCommand`: exactly one of `id` or `last`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnDeleteArgs {
    pub id: Option<ColumnId>,
    pub last: bool,
}

#[derive(Debug, Clone)]
enum ColumnDeleteDelta {
    /// Only one column remained; nothing was removed.
    Unchanged,
    Removed {
        index: usize,
        column: Column,
        /// Removed cell of every row with the index it held.
        cells: Vec<(RowId, usize, Cell)>,
        /// Removed filters with their original index, ascending.
        filters: Vec<(usize, Filter)>,
        /// Frozen column count before the delete.
        frozen: usize,
    },
}

/// Deletes a column, its cells and every filter on it.
///
/// Deleting the only column of a table is a no-op. Deleting the sorted
/// column clears the sort, since the sort lives on the column itself.
/// The frozen column count is clamped to the remaining columns.
#[derive(Debug, Clone)]
pub struct ColumnDeleteCommand {
    target: Target<ColumnId>,
    delta: Option<ColumnDeleteDelta>,
}

impl ColumnDeleteCommand {
    pub const NAME: &'static str = "column_delete";

    pub fn new(args: ColumnDeleteArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            target: Target::from_args(args.id, args.last, Self::NAME)?,
            delta: None,
        })
    }
}

impl Command for ColumnDeleteCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        if snapshot.columns.len() <= 1 {
            self.delta = Some(ColumnDeleteDelta::Unchanged);
            return Ok(snapshot.clone());
        }

        let index = match self.target {
            Target::Id(column_id) => snapshot.column_index(column_id)?,
            Target::Last => snapshot.columns.len() - 1,
        };
        let mut next = snapshot.clone();
        let column = next.columns.remove(index);

        let mut cells = Vec::with_capacity(next.rows.len());
        for row in &mut next.rows {
            let cell_index = row
                .cell_index(column.id)
                .ok_or(NotFoundError::cell(column.id))?;
            cells.push((row.id, cell_index, row.cells.remove(cell_index)));
        }

        let mut filters = Vec::new();
        let mut kept = Vec::with_capacity(next.filters.len());
        for (filter_index, filter) in next.filters.drain(..).enumerate() {
            if filter.column_id == column.id {
                filters.push((filter_index, filter));
            } else {
                kept.push(filter);
            }
        }
        next.filters = kept;

        let frozen = next.settings.num_frozen_columns;
        next.settings.num_frozen_columns = frozen.min(next.columns.len());

        self.delta = Some(ColumnDeleteDelta::Removed {
            index,
            column,
            cells,
            filters,
            frozen,
        });
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let delta = self.delta.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let next = match delta {
            ColumnDeleteDelta::Unchanged => snapshot.clone(),
            ColumnDeleteDelta::Removed {
                index,
                column,
                cells,
                filters,
                frozen,
            } => {
                let mut next = snapshot.clone();
                let positions: HashMap<RowId, usize> = next
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(position, row)| (row.id, position))
                    .collect();
                for (row_id, cell_index, cell) in cells {
                    let position = *positions.get(row_id).ok_or(NotFoundError::row(*row_id))?;
                    let row_cells = &mut next.rows[position].cells;
                    row_cells.insert((*cell_index).min(row_cells.len()), cell.clone());
                }
                next.columns
                    .insert((*index).min(next.columns.len()), column.clone());
                for (filter_index, filter) in filters {
                    next.filters
                        .insert((*filter_index).min(next.filters.len()), filter.clone());
                }
                next.settings.num_frozen_columns = *frozen;
                next
            }
        };

        self.delta = None;
        Ok(next)
    }
}

/// Arguments for `ColumnReorderCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnReorderArgs {
    pub id: Option<ColumnId>,
    /// Destination index; indices past the end clamp to the last position.
    pub to_index: Option<usize>,
}

/// Moves a column, and the matching cell of every row, to a new index.
#[derive(Debug, Clone)]
pub struct ColumnReorderCommand {
    column_id: ColumnId,
    to_index: usize,
    moved: Option<(usize, usize)>,
}

impl ColumnReorderCommand {
    pub const NAME: &'static str = "column_reorder";

    pub fn new(args: ColumnReorderArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            column_id: required(args.id, Self::NAME, "id")?,
            to_index: required(args.to_index, Self::NAME, "to_index")?,
            moved: None,
        })
    }
}

impl Command for ColumnReorderCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let from = snapshot.column_index(self.column_id)?;
        let mut next = snapshot.clone();
        let to = move_item(&mut next.columns, from, self.to_index);
        for row in &mut next.rows {
            move_item(&mut row.cells, from, to);
        }

        self.moved = Some((from, to));
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let (from, to) = self.moved.ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        move_item(&mut next.columns, to, from);
        for row in &mut next.rows {
            move_item(&mut row.cells, to, from);
        }

        self.moved = None;
        Ok(next)
    }
}

/// Arguments for `ColumnUpdateCommand`. Only `id` is required; every other
/// provided field replaces the column's current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnUpdateArgs {
    pub id: Option<ColumnId>,
    pub name: Option<String>,
    pub is_visible: Option<bool>,
    pub width: Option<u32>,
    pub currency: Option<CurrencyType>,
    pub date_format: Option<DateFormat>,
    pub number_format: Option<NumberFormat>,
    pub number_prefix: Option<String>,
    pub number_suffix: Option<String>,
    pub calculation_type: Option<CalculationType>,
}

/// Edits display properties of one column.
#[derive(Debug, Clone)]
pub struct ColumnUpdateCommand {
    column_id: ColumnId,
    args: ColumnUpdateArgs,
    previous: Option<Column>,
}

impl ColumnUpdateCommand {
    pub const NAME: &'static str = "column_update";

    pub fn new(args: ColumnUpdateArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            column_id: required(args.id, Self::NAME, "id")?,
            args,
            previous: None,
        })
    }
}

impl Command for ColumnUpdateCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = snapshot.column_index(self.column_id)?;
        let mut next = snapshot.clone();
        let column = &mut next.columns[index];
        let previous = column.clone();

        let args = &self.args;
        if let Some(name) = &args.name {
            column.name = name.clone();
        }
        if let Some(is_visible) = args.is_visible {
            column.is_visible = is_visible;
        }
        if let Some(width) = args.width {
            column.width = width;
        }
        if let Some(currency) = args.currency {
            column.currency = currency;
        }
        if let Some(date_format) = args.date_format {
            column.date_format = date_format;
        }
        if let Some(number_format) = args.number_format {
            column.number_format = number_format;
        }
        if let Some(prefix) = &args.number_prefix {
            column.number_prefix = prefix.clone();
        }
        if let Some(suffix) = &args.number_suffix {
            column.number_suffix = suffix.clone();
        }
        if let Some(calculation_type) = args.calculation_type {
            column.calculation_type = calculation_type;
        }

        self.previous = Some(previous);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let previous = self.previous.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let index = snapshot.column_index(self.column_id)?;
        let mut next = snapshot.clone();
        next.columns[index] = previous.clone();

        self.previous = None;
        Ok(next)
    }
}

/// Arguments for `ColumnSortCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnSortArgs {
    pub id: Option<ColumnId>,
    pub dir: Option<SortDir>,
}

/// Sets the sort direction of one column and clears every other sort.
#[derive(Debug, Clone)]
pub struct ColumnSortCommand {
    column_id: ColumnId,
    dir: SortDir,
    previous: Option<Vec<SortDir>>,
}

impl ColumnSortCommand {
    pub const NAME: &'static str = "column_sort";

    pub fn new(args: ColumnSortArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            column_id: required(args.id, Self::NAME, "id")?,
            dir: required(args.dir, Self::NAME, "dir")?,
            previous: None,
        })
    }
}

impl Command for ColumnSortCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        snapshot.column(self.column_id)?;
        let mut next = snapshot.clone();
        let previous = next.columns.iter().map(|column| column.sort_dir).collect();
        for column in &mut next.columns {
            column.sort_dir = if column.id == self.column_id {
                self.dir
            } else {
                SortDir::None
            };
        }

        self.previous = Some(previous);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let previous = self.previous.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        for (column, dir) in next.columns.iter_mut().zip(previous) {
            column.sort_dir = *dir;
        }

        self.previous = None;
        Ok(next)
    }
}
