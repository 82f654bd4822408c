//! Reversible, validated document mutations.
//!
//! # Responsibility
//! - Define the `Command` contract every mutation satisfies.
//! - Provide one command per structural operation on a loom document.
//! - Turn plain host argument records (`CommandRequest`) into commands.
//!
//! # Invariants
//! - Construction validates the argument record before any state is read.
//! - `execute` is pure over its input: it returns a new snapshot and records
//!   only the minimal delta needed to reverse itself.
//! - `undo(execute(s)) == s` for every command.
//! - `undo` before `execute` fails with `UndoError`.
//! - Every command enumerates and updates the dependent collections it
//!   touches (cells, filters, tags) itself; there are no implicit cascades.
//!
//! A command is a two-state machine {unapplied, applied}. Redo re-enters the
//! applied state through a fresh `execute`; ids generated by the first
//! execution are reused so redo reproduces the same snapshot.

pub mod cell;
pub mod column;
pub mod column_type;
pub mod error;
pub mod filter;
pub mod row;
pub mod settings;
pub mod source;
pub mod tag;

use crate::model::snapshot::Snapshot;
use error::{ArgumentsError, CommandResult};
use serde::Deserialize;

pub use cell::{CellUpdateArgs, CellUpdateCommand};
pub use column::{
    ColumnAddArgs, ColumnAddCommand, ColumnDeleteArgs, ColumnDeleteCommand, ColumnReorderArgs,
    ColumnReorderCommand, ColumnSortArgs, ColumnSortCommand, ColumnUpdateArgs,
    ColumnUpdateCommand,
};
pub use column_type::{ColumnTypeChangeArgs, ColumnTypeChangeCommand};
pub use error::{CommandError, UndoError};
pub use filter::{
    FilterAddArgs, FilterAddCommand, FilterDeleteArgs, FilterDeleteCommand, FilterUpdateArgs,
    FilterUpdateCommand,
};
pub use row::{
    RowAddArgs, RowAddCommand, RowDeleteArgs, RowDeleteCommand, RowReorderArgs,
    RowReorderCommand,
};
pub use settings::{SettingsUpdateArgs, SettingsUpdateCommand};
pub use source::{SourceAddArgs, SourceAddCommand, SourceDeleteArgs, SourceDeleteCommand};
pub use tag::{
    TagAddArgs, TagAddCommand, TagAttachArgs, TagAttachCommand, TagDeleteArgs,
    TagDeleteCommand, TagDetachArgs, TagDetachCommand, TagUpdateArgs, TagUpdateCommand,
};

/// A reversible mutation over a `Snapshot`.
///
/// Implementations are self-contained values: they hold their validated
/// arguments plus the delta captured by the last `execute`, and no reference
/// to history or other commands.
pub trait Command: Send {
    /// Stable command name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Applies the command, returning the next snapshot.
    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot>;

    /// Reverts the last `execute`, returning the restored snapshot.
    ///
    /// # Errors
    /// - `CommandError::Undo` when the command is not applied.
    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot>;

    /// Re-applies the command after an undo.
    fn redo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        self.execute(snapshot)
    }
}

/// Entity selected either by id or as the last of its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target<Id> {
    Id(Id),
    Last,
}

impl<Id> Target<Id> {
    /// Builds a target from an `{id}` / `{last: true}` argument pair.
    pub(crate) fn from_args(
        id: Option<Id>,
        last: bool,
        command: &'static str,
    ) -> Result<Self, ArgumentsError> {
        match (id, last) {
            (Some(_), true) => Err(ArgumentsError::Conflict {
                command,
                fields: "id, last",
            }),
            (Some(id), false) => Ok(Self::Id(id)),
            (None, true) => Ok(Self::Last),
            (None, false) => Err(ArgumentsError::Missing {
                command,
                field: "id",
            }),
        }
    }
}

/// Moves `items[from]` to `to`, clamping `to` to the last valid index.
///
/// Returns the index the item ended up at.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> usize {
    let to = to.min(items.len().saturating_sub(1));
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    to
}

/// Plain argument record submitted by a host, tagged by command name.
///
/// Wire shape: `{"command": "column_delete", "args": {"last": true}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum CommandRequest {
    ColumnAdd(ColumnAddArgs),
    ColumnDelete(ColumnDeleteArgs),
    ColumnReorder(ColumnReorderArgs),
    ColumnUpdate(ColumnUpdateArgs),
    ColumnSort(ColumnSortArgs),
    ColumnTypeChange(ColumnTypeChangeArgs),
    RowAdd(RowAddArgs),
    RowDelete(RowDeleteArgs),
    RowReorder(RowReorderArgs),
    CellUpdate(CellUpdateArgs),
    TagAdd(TagAddArgs),
    TagUpdate(TagUpdateArgs),
    TagAttach(TagAttachArgs),
    TagDetach(TagDetachArgs),
    TagDelete(TagDeleteArgs),
    FilterAdd(FilterAddArgs),
    FilterUpdate(FilterUpdateArgs),
    FilterDelete(FilterDeleteArgs),
    SourceAdd(SourceAddArgs),
    SourceDelete(SourceDeleteArgs),
    SettingsUpdate(SettingsUpdateArgs),
}

impl CommandRequest {
    /// Validates the argument record and builds the command.
    pub fn into_command(self) -> Result<Box<dyn Command>, ArgumentsError> {
        Ok(match self {
            Self::ColumnAdd(args) => Box::new(ColumnAddCommand::new(args)),
            Self::ColumnDelete(args) => Box::new(ColumnDeleteCommand::new(args)?),
            Self::ColumnReorder(args) => Box::new(ColumnReorderCommand::new(args)?),
            Self::ColumnUpdate(args) => Box::new(ColumnUpdateCommand::new(args)?),
            Self::ColumnSort(args) => Box::new(ColumnSortCommand::new(args)?),
            Self::ColumnTypeChange(args) => Box::new(ColumnTypeChangeCommand::new(args)?),
            Self::RowAdd(args) => Box::new(RowAddCommand::new(args)?),
            Self::RowDelete(args) => Box::new(RowDeleteCommand::new(args)?),
            Self::RowReorder(args) => Box::new(RowReorderCommand::new(args)?),
            Self::CellUpdate(args) => Box::new(CellUpdateCommand::new(args)?),
            Self::TagAdd(args) => Box::new(TagAddCommand::new(args)?),
            Self::TagUpdate(args) => Box::new(TagUpdateCommand::new(args)?),
            Self::TagAttach(args) => Box::new(TagAttachCommand::new(args)?),
            Self::TagDetach(args) => Box::new(TagDetachCommand::new(args)?),
            Self::TagDelete(args) => Box::new(TagDeleteCommand::new(args)?),
            Self::FilterAdd(args) => Box::new(FilterAddCommand::new(args)?),
            Self::FilterUpdate(args) => Box::new(FilterUpdateCommand::new(args)?),
            Self::FilterDelete(args) => Box::new(FilterDeleteCommand::new(args)?),
            Self::SourceAdd(args) => Box::new(SourceAddCommand::new(args)?),
            Self::SourceDelete(args) => Box::new(SourceDeleteCommand::new(args)?),
            Self::SettingsUpdate(args) => Box::new(SettingsUpdateCommand::new(args)?),
        })
    }
}
