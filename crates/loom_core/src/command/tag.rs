//! Tag lifecycle: add, update, attach, detach and delete.
//!
//! # Invariants
//! - A column exclusively owns its tags; cells and filters only hold ids.
//! - Deleting a tag strips its id from every cell and filter condition on
//!   the owning column. Undo restores the tag at its original position and
//!   every stripped reference in original order.

use crate::command::cell::{edit_cell, revert_cell, CellEdit};
use crate::command::error::{
    required, required_text, ArgumentsError, CommandError, CommandResult, UndoError,
};
use crate::command::Command;
use crate::model::cell::CellValue;
use crate::model::column::{CellType, Column, ColumnId};
use crate::model::error::NotFoundError;
use crate::model::filter::{FilterCondition, FilterId};
use crate::model::now_millis;
use crate::model::row::RowId;
use crate::model::snapshot::Snapshot;
use crate::model::tag::{Color, Tag, TagId};
use serde::Deserialize;

fn ensure_tag_column(column: &Column) -> CommandResult<()> {
    if column.kind.has_tags() {
        return Ok(());
    }
    Err(CommandError::TypeMismatch {
        column_id: column.id,
        expected: CellType::Tag,
        actual: column.kind,
    })
}

/// Removes `tag_ids` from a payload. Returns `None` when nothing changed.
fn strip_tags(value: &CellValue, tag_ids: &[TagId]) -> Option<CellValue> {
    match value {
        CellValue::Tag(Some(tag_id)) if tag_ids.contains(tag_id) => Some(CellValue::Tag(None)),
        CellValue::MultiTag(current) if current.iter().any(|id| tag_ids.contains(id)) => Some(
            CellValue::MultiTag(
                current
                    .iter()
                    .copied()
                    .filter(|id| !tag_ids.contains(id))
                    .collect(),
            ),
        ),
        _ => None,
    }
}

fn strip_condition(condition: &FilterCondition, tag_id: TagId) -> Option<FilterCondition> {
    match condition {
        FilterCondition::Tag {
            operator,
            tag_id: Some(current),
        } if *current == tag_id => Some(FilterCondition::Tag {
            operator: *operator,
            tag_id: None,
        }),
        FilterCondition::MultiTag { operator, tag_ids } if tag_ids.contains(&tag_id) => {
            Some(FilterCondition::MultiTag {
                operator: *operator,
                tag_ids: tag_ids.iter().copied().filter(|id| *id != tag_id).collect(),
            })
        }
        _ => None,
    }
}

/// Arguments for `TagAddCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagAddArgs {
    pub column_id: Option<ColumnId>,
    pub content: Option<String>,
    pub color: Option<Color>,
}

/// Appends a tag to a tag or multi-tag column.
#[derive(Debug, Clone)]
pub struct TagAddCommand {
    column_id: ColumnId,
    tag: Tag,
    applied: bool,
}

impl TagAddCommand {
    pub const NAME: &'static str = "tag_add";

    pub fn new(args: TagAddArgs) -> Result<Self, ArgumentsError> {
        let column_id = required(args.column_id, Self::NAME, "column_id")?;
        let content = required_text(args.content, Self::NAME, "content")?;
        Ok(Self {
            column_id,
            tag: Tag::new(content.trim(), args.color.unwrap_or_default()),
            applied: false,
        })
    }

    pub fn tag_id(&self) -> TagId {
        self.tag.id
    }
}

impl Command for TagAddCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = snapshot.column_index(self.column_id)?;
        ensure_tag_column(&snapshot.columns[index])?;

        let mut next = snapshot.clone();
        next.columns[index].tags.push(self.tag.clone());

        self.applied = true;
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        if !self.applied {
            return Err(UndoError::new(Self::NAME).into());
        }
        let index = snapshot.column_index(self.column_id)?;
        let mut next = snapshot.clone();
        next.columns[index].tags.retain(|tag| tag.id != self.tag.id);

        self.applied = false;
        Ok(next)
    }
}

/// Arguments for `TagUpdateCommand`. At least one of `content`/`color`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagUpdateArgs {
    pub column_id: Option<ColumnId>,
    pub tag_id: Option<TagId>,
    pub content: Option<String>,
    pub color: Option<Color>,
}

/// Renames or recolors a tag.
#[derive(Debug, Clone)]
pub struct TagUpdateCommand {
    column_id: ColumnId,
    tag_id: TagId,
    content: Option<String>,
    color: Option<Color>,
    previous: Option<Tag>,
}

impl TagUpdateCommand {
    pub const NAME: &'static str = "tag_update";

    pub fn new(args: TagUpdateArgs) -> Result<Self, ArgumentsError> {
        let column_id = required(args.column_id, Self::NAME, "column_id")?;
        let tag_id = required(args.tag_id, Self::NAME, "tag_id")?;
        if args.content.is_none() && args.color.is_none() {
            return Err(ArgumentsError::Missing {
                command: Self::NAME,
                field: "content",
            });
        }
        let content = match args.content {
            Some(content) => Some(required_text(Some(content), Self::NAME, "content")?),
            None => None,
        };
        Ok(Self {
            column_id,
            tag_id,
            content: content.map(|content| content.trim().to_string()),
            color: args.color,
            previous: None,
        })
    }
}

impl Command for TagUpdateCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let column_index = snapshot.column_index(self.column_id)?;
        let tag_index = snapshot.columns[column_index]
            .tag_index(self.tag_id)
            .ok_or(NotFoundError::tag(self.tag_id))?;

        let mut next = snapshot.clone();
        let tag = &mut next.columns[column_index].tags[tag_index];
        let previous = tag.clone();
        if let Some(content) = &self.content {
            tag.content = content.clone();
        }
        if let Some(color) = self.color {
            tag.color = color;
        }

        self.previous = Some(previous);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let previous = self.previous.clone().ok_or(UndoError::new(Self::NAME))?;
        let column_index = snapshot.column_index(self.column_id)?;
        let tag_index = snapshot.columns[column_index]
            .tag_index(self.tag_id)
            .ok_or(NotFoundError::tag(self.tag_id))?;

        let mut next = snapshot.clone();
        next.columns[column_index].tags[tag_index] = previous;

        self.previous = None;
        Ok(next)
    }
}

/// Arguments for `TagAttachCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagAttachArgs {
    pub row_id: Option<RowId>,
    pub column_id: Option<ColumnId>,
    pub tag_id: Option<TagId>,
    /// Edit timestamp; defaults to the construction time.
    pub edited_at: Option<i64>,
}

/// References an existing column tag from one cell.
///
/// Single-tag cells are replaced; multi-tag cells gain the id at the end
/// unless already present.
#[derive(Debug, Clone)]
pub struct TagAttachCommand {
    row_id: RowId,
    column_id: ColumnId,
    tag_id: TagId,
    edited_at: i64,
    edit: Option<CellEdit>,
}

impl TagAttachCommand {
    pub const NAME: &'static str = "tag_attach";

    pub fn new(args: TagAttachArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            row_id: required(args.row_id, Self::NAME, "row_id")?,
            column_id: required(args.column_id, Self::NAME, "column_id")?,
            tag_id: required(args.tag_id, Self::NAME, "tag_id")?,
            edited_at: args.edited_at.unwrap_or_else(now_millis),
            edit: None,
        })
    }
}

impl Command for TagAttachCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let tag_id = self.tag_id;
        let (next, edit) = edit_cell(
            snapshot,
            self.row_id,
            self.column_id,
            self.edited_at,
            |column, current| {
                ensure_tag_column(column)?;
                column.tag(tag_id).ok_or(NotFoundError::tag(tag_id))?;
                Ok(match current {
                    CellValue::MultiTag(tag_ids) if tag_ids.contains(&tag_id) => current.clone(),
                    CellValue::MultiTag(tag_ids) => {
                        let mut tag_ids = tag_ids.clone();
                        tag_ids.push(tag_id);
                        CellValue::MultiTag(tag_ids)
                    }
                    _ => CellValue::Tag(Some(tag_id)),
                })
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

/// Arguments for `TagDetachCommand`: `tag_id`, `tag_ids`, or both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagDetachArgs {
    pub row_id: Option<RowId>,
    pub column_id: Option<ColumnId>,
    pub tag_id: Option<TagId>,
    pub tag_ids: Option<Vec<TagId>>,
    /// Edit timestamp; defaults to the construction time.
    pub edited_at: Option<i64>,
}

/// Removes one or more tag references from one cell.
///
/// Ids the cell does not reference are ignored.
#[derive(Debug, Clone)]
pub struct TagDetachCommand {
    row_id: RowId,
    column_id: ColumnId,
    tag_ids: Vec<TagId>,
    edited_at: i64,
    edit: Option<CellEdit>,
}

impl TagDetachCommand {
    pub const NAME: &'static str = "tag_detach";

    pub fn new(args: TagDetachArgs) -> Result<Self, ArgumentsError> {
        let row_id = required(args.row_id, Self::NAME, "row_id")?;
        let column_id = required(args.column_id, Self::NAME, "column_id")?;
        if args.tag_id.is_none() && args.tag_ids.is_none() {
            return Err(ArgumentsError::Missing {
                command: Self::NAME,
                field: "tag_id",
            });
        }
        let mut tag_ids: Vec<TagId> = Vec::new();
        for tag_id in args.tag_id.into_iter().chain(args.tag_ids.unwrap_or_default()) {
            if !tag_ids.contains(&tag_id) {
                tag_ids.push(tag_id);
            }
        }
        if tag_ids.is_empty() {
            return Err(ArgumentsError::Empty {
                command: Self::NAME,
                field: "tag_ids",
            });
        }
        Ok(Self {
            row_id,
            column_id,
            tag_ids,
            edited_at: args.edited_at.unwrap_or_else(now_millis),
            edit: None,
        })
    }
}

impl Command for TagDetachCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let tag_ids = &self.tag_ids;
        let (next, edit) = edit_cell(
            snapshot,
            self.row_id,
            self.column_id,
            self.edited_at,
            |column, current| {
                ensure_tag_column(column)?;
                Ok(strip_tags(current, tag_ids).unwrap_or_else(|| current.clone()))
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

/// Arguments for `TagDeleteCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagDeleteArgs {
    pub column_id: Option<ColumnId>,
    pub tag_id: Option<TagId>,
}

#[derive(Debug, Clone)]
struct DeletedTag {
    index: usize,
    tag: Tag,
    cells: Vec<(RowId, CellValue)>,
    filters: Vec<(FilterId, FilterCondition)>,
}

/// Removes a tag from its column and every reference to it.
#[derive(Debug, Clone)]
pub struct TagDeleteCommand {
    column_id: ColumnId,
    tag_id: TagId,
    deleted: Option<DeletedTag>,
}

impl TagDeleteCommand {
    pub const NAME: &'static str = "tag_delete";

    pub fn new(args: TagDeleteArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            column_id: required(args.column_id, Self::NAME, "column_id")?,
            tag_id: required(args.tag_id, Self::NAME, "tag_id")?,
            deleted: None,
        })
    }
}

impl Command for TagDeleteCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let column_index = snapshot.column_index(self.column_id)?;
        let index = snapshot.columns[column_index]
            .tag_index(self.tag_id)
            .ok_or(NotFoundError::tag(self.tag_id))?;

        let mut next = snapshot.clone();
        let tag = next.columns[column_index].tags.remove(index);

        let stripped = [self.tag_id];
        let mut cells = Vec::new();
        for row in &mut next.rows {
            let Some(cell) = row.cells.iter_mut().find(|cell| cell.column_id == self.column_id)
            else {
                continue;
            };
            if let Some(value) = strip_tags(&cell.value, &stripped) {
                cells.push((row.id, std::mem::replace(&mut cell.value, value)));
            }
        }

        let mut filters = Vec::new();
        for filter in next
            .filters
            .iter_mut()
            .filter(|filter| filter.column_id == self.column_id)
        {
            if let Some(condition) = strip_condition(&filter.condition, self.tag_id) {
                filters.push((filter.id, std::mem::replace(&mut filter.condition, condition)));
            }
        }

        self.deleted = Some(DeletedTag {
            index,
            tag,
            cells,
            filters,
        });
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let deleted = self.deleted.clone().ok_or(UndoError::new(Self::NAME))?;
        let column_index = snapshot.column_index(self.column_id)?;

        let mut next = snapshot.clone();
        let tags = &mut next.columns[column_index].tags;
        tags.insert(deleted.index.min(tags.len()), deleted.tag);

        for (row_id, value) in deleted.cells {
            let row_index = next.row_index(row_id)?;
            let cell = next.rows[row_index]
                .cells
                .iter_mut()
                .find(|cell| cell.column_id == self.column_id)
                .ok_or(NotFoundError::cell(self.column_id))?;
            cell.value = value;
        }
        for (filter_id, condition) in deleted.filters {
            let filter_index = next.filter_index(filter_id)?;
            next.filters[filter_index].condition = condition;
        }

        self.deleted = None;
        Ok(next)
    }
}
