//! Row source add/delete.
//!
//! # Invariants
//! - Deleting a source detaches every row that referenced it; the rows
//!   themselves stay. Undo restores the source and re-attaches those rows.

use crate::command::error::{required, required_text, ArgumentsError, CommandResult, UndoError};
use crate::command::Command;
use crate::model::error::NotFoundError;
use crate::model::row::RowId;
use crate::model::snapshot::Snapshot;
use crate::model::source::{Source, SourceId, SourceType};
use serde::Deserialize;

/// Arguments for `SourceAddCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceAddArgs {
    #[serde(rename = "type")]
    pub kind: Option<SourceType>,
    pub content: Option<String>,
}

/// Appends a row source.
#[derive(Debug, Clone)]
pub struct SourceAddCommand {
    source: Source,
    applied: bool,
}

impl SourceAddCommand {
    pub const NAME: &'static str = "source_add";

    pub fn new(args: SourceAddArgs) -> Result<Self, ArgumentsError> {
        let content = required_text(args.content, Self::NAME, "content")?;
        Ok(Self {
            source: Source::new(args.kind.unwrap_or_default(), content),
            applied: false,
        })
    }

    pub fn source_id(&self) -> SourceId {
        self.source.id
    }
}

impl Command for SourceAddCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let mut next = snapshot.clone();
        next.sources.push(self.source.clone());

        self.applied = true;
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        if !self.applied {
            return Err(UndoError::new(Self::NAME).into());
        }
        let mut next = snapshot.clone();
        next.sources.retain(|source| source.id != self.source.id);

        self.applied = false;
        Ok(next)
    }
}

/// Arguments for `SourceDeleteCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceDeleteArgs {
    pub id: Option<SourceId>,
}

#[derive(Debug, Clone)]
struct DeletedSource {
    index: usize,
    source: Source,
    detached: Vec<RowId>,
}

/// Removes a source and detaches its rows.
#[derive(Debug, Clone)]
pub struct SourceDeleteCommand {
    source_id: SourceId,
    deleted: Option<DeletedSource>,
}

impl SourceDeleteCommand {
    pub const NAME: &'static str = "source_delete";

    pub fn new(args: SourceDeleteArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            source_id: required(args.id, Self::NAME, "id")?,
            deleted: None,
        })
    }
}

impl Command for SourceDeleteCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = snapshot
            .sources
            .iter()
            .position(|source| source.id == self.source_id)
            .ok_or(NotFoundError::source(self.source_id))?;
        let mut next = snapshot.clone();
        let source = next.sources.remove(index);

        let mut detached = Vec::new();
        for row in next
            .rows
            .iter_mut()
            .filter(|row| row.source_id == Some(self.source_id))
        {
            row.source_id = None;
            detached.push(row.id);
        }

        self.deleted = Some(DeletedSource {
            index,
            source,
            detached,
        });
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let deleted = self.deleted.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        for row_id in &deleted.detached {
            let index = next.row_index(*row_id)?;
            next.rows[index].source_id = Some(self.source_id);
        }
        next.sources.insert(
            deleted.index.min(next.sources.len()),
            deleted.source.clone(),
        );

        self.deleted = None;
        Ok(next)
    }
}
