//! Column type change.
//!
//! # Responsibility
//! - Convert every cell of a column to the payload shape of a new type.
//! - Keep the column's filters meaningful by resetting conditions whose
//!   comparison family no longer fits the new type.
//!
//! # Invariants
//! - Forward conversion is lossy: content that cannot be represented in the
//!   new type is dropped, never rejected. The count of dropped payloads is
//!   reported through `dropped_values()` and logged.
//! - Undo is lossless: the previous column (including its tag set), every
//!   previous payload and every previous filter condition are restored
//!   verbatim.
//! - Tags created while converting text into tags keep their ids across redo.

use crate::command::error::{required, ArgumentsError, CommandResult, UndoError};
use crate::command::Command;
use crate::model::cell::{parse_date, parse_number_prefix, CellValue};
use crate::model::column::{CalculationType, CellType, Column, ColumnId};
use crate::model::error::NotFoundError;
use crate::model::filter::{FilterCondition, FilterId};
use crate::model::row::{Row, RowId};
use crate::model::snapshot::Snapshot;
use crate::model::source::Source;
use crate::model::tag::{Color, Tag, TagId};
use log::warn;
use serde::Deserialize;

/// Arguments for `ColumnTypeChangeCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnTypeChangeArgs {
    pub id: Option<ColumnId>,
    #[serde(rename = "type")]
    pub kind: Option<CellType>,
}

#[derive(Debug, Clone)]
struct TypeChangeDelta {
    previous_column: Column,
    previous_values: Vec<(RowId, CellValue)>,
    previous_filters: Vec<(FilterId, FilterCondition)>,
}

/// Changes the declared type of a column and converts its cells.
#[derive(Debug, Clone)]
pub struct ColumnTypeChangeCommand {
    column_id: ColumnId,
    kind: CellType,
    minted_tags: Vec<Tag>,
    dropped: usize,
    delta: Option<TypeChangeDelta>,
}

impl ColumnTypeChangeCommand {
    pub const NAME: &'static str = "column_type_change";

    pub fn new(args: ColumnTypeChangeArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            column_id: required(args.id, Self::NAME, "id")?,
            kind: required(args.kind, Self::NAME, "type")?,
            minted_tags: Vec::new(),
            dropped: 0,
            delta: None,
        })
    }

    /// Number of cells whose content was dropped by the last `execute`.
    pub fn dropped_values(&self) -> usize {
        self.dropped
    }
}

impl Command for ColumnTypeChangeCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = snapshot.column_index(self.column_id)?;
        let previous_column = snapshot.columns[index].clone();
        let mut next = snapshot.clone();
        let mut delta = TypeChangeDelta {
            previous_column: previous_column.clone(),
            previous_values: Vec::new(),
            previous_filters: Vec::new(),
        };
        self.dropped = 0;

        if previous_column.kind == self.kind {
            self.delta = Some(delta);
            return Ok(next);
        }

        let mut column = previous_column.clone();
        column.kind = self.kind;
        if column.calculation_type.is_numeric() && self.kind != CellType::Number {
            column.calculation_type = CalculationType::None;
        }

        let mut converter = Converter {
            from: &previous_column,
            to: &mut column,
            sources: &next.sources,
            minted: &mut self.minted_tags,
        };
        for row in &mut next.rows {
            let cell_index = row
                .cell_index(self.column_id)
                .ok_or(NotFoundError::cell(self.column_id))?;
            let previous = &row.cells[cell_index].value;
            let converted = converter.convert(previous, row);
            if previous.has_user_content() && !converted.has_user_content() {
                self.dropped += 1;
            }
            let previous = std::mem::replace(&mut row.cells[cell_index].value, converted);
            delta.previous_values.push((row.id, previous));
        }

        let default_condition = FilterCondition::default_for(self.kind);
        for filter in next
            .filters
            .iter_mut()
            .filter(|filter| filter.column_id == self.column_id)
        {
            if !filter.condition.fits(self.kind) {
                let previous = std::mem::replace(&mut filter.condition, default_condition.clone());
                delta.previous_filters.push((filter.id, previous));
            }
        }

        next.columns[index] = column;
        if self.dropped > 0 {
            warn!(
                "event=column_type_change module=command status=lossy column_id={} from={} to={} dropped={}",
                self.column_id,
                previous_column.kind.as_str(),
                self.kind.as_str(),
                self.dropped
            );
        }

        self.delta = Some(delta);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let delta = self.delta.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let index = snapshot.column_index(self.column_id)?;
        let mut next = snapshot.clone();
        next.columns[index] = delta.previous_column.clone();

        for (row_id, value) in &delta.previous_values {
            let row = next
                .rows
                .iter_mut()
                .find(|row| row.id == *row_id)
                .ok_or(NotFoundError::row(*row_id))?;
            let cell_index = row
                .cell_index(self.column_id)
                .ok_or(NotFoundError::cell(self.column_id))?;
            row.cells[cell_index].value = value.clone();
        }
        for (filter_id, condition) in &delta.previous_filters {
            let filter = next
                .filters
                .iter_mut()
                .find(|filter| filter.id == *filter_id)
                .ok_or(NotFoundError::filter(*filter_id))?;
            filter.condition = condition.clone();
        }

        self.delta = None;
        Ok(next)
    }
}

/// Cell payload conversion between column types.
struct Converter<'a> {
    from: &'a Column,
    to: &'a mut Column,
    sources: &'a [Source],
    /// Tags created by earlier executions, reused by label.
    minted: &'a mut Vec<Tag>,
}

impl Converter<'_> {
    fn convert(&mut self, value: &CellValue, row: &Row) -> CellValue {
        match self.to.kind {
            CellType::Text => CellValue::Text(self.text_of(value, row)),
            CellType::File => CellValue::File(self.text_of(value, row)),
            CellType::Embed => CellValue::Embed(self.text_of(value, row)),
            CellType::SourceFile => CellValue::SourceFile(self.text_of(value, row)),
            CellType::Number => CellValue::Number(self.number_of(value, row)),
            CellType::Checkbox => CellValue::Checkbox(self.checkbox_of(value, row)),
            CellType::Date => CellValue::Date(self.date_of(value, row)),
            CellType::Tag => CellValue::Tag(self.tags_of(value, row, false).into_iter().next()),
            CellType::MultiTag => CellValue::MultiTag(self.tags_of(value, row, true)),
            CellType::CreationTime => CellValue::CreationTime,
            CellType::LastEditedTime => CellValue::LastEditedTime,
            CellType::Source => CellValue::Source,
        }
    }

    fn text_of(&self, value: &CellValue, row: &Row) -> String {
        value.display_text(self.from, row, self.sources)
    }

    fn number_of(&self, value: &CellValue, row: &Row) -> Option<f64> {
        match value {
            CellValue::Number(number) => *number,
            CellValue::Checkbox(_)
            | CellValue::Date(_)
            | CellValue::CreationTime
            | CellValue::LastEditedTime => None,
            CellValue::Text(_)
            | CellValue::File(_)
            | CellValue::Embed(_)
            | CellValue::SourceFile(_)
            | CellValue::Tag(_)
            | CellValue::MultiTag(_)
            | CellValue::Source => parse_number_prefix(&self.text_of(value, row)),
        }
    }

    fn checkbox_of(&self, value: &CellValue, row: &Row) -> bool {
        match value {
            CellValue::Checkbox(checked) => *checked,
            CellValue::Number(number) => number.is_some_and(|n| n != 0.0),
            CellValue::Text(_)
            | CellValue::File(_)
            | CellValue::Embed(_)
            | CellValue::SourceFile(_)
            | CellValue::Tag(_)
            | CellValue::MultiTag(_) => is_checked_text(&self.text_of(value, row)),
            CellValue::Date(_)
            | CellValue::CreationTime
            | CellValue::LastEditedTime
            | CellValue::Source => false,
        }
    }

    fn date_of(&self, value: &CellValue, row: &Row) -> Option<i64> {
        match value {
            CellValue::Date(millis) => *millis,
            CellValue::CreationTime => Some(row.creation_time),
            CellValue::LastEditedTime => Some(row.last_edited_time),
            CellValue::Number(_) | CellValue::Checkbox(_) => None,
            CellValue::Text(_)
            | CellValue::File(_)
            | CellValue::Embed(_)
            | CellValue::SourceFile(_)
            | CellValue::Tag(_)
            | CellValue::MultiTag(_)
            | CellValue::Source => parse_date(&self.text_of(value, row), self.to.date_format),
        }
    }

    /// Tag ids for a Tag/MultiTag payload. Labels are split on `,` when
    /// `split` is set; unknown labels become new tags on the target column.
    fn tags_of(&mut self, value: &CellValue, row: &Row, split: bool) -> Vec<TagId> {
        match value {
            CellValue::Tag(_) | CellValue::MultiTag(_) => value.tag_ids().to_vec(),
            CellValue::Checkbox(_) => Vec::new(),
            CellValue::Text(_)
            | CellValue::Number(_)
            | CellValue::Date(_)
            | CellValue::CreationTime
            | CellValue::LastEditedTime
            | CellValue::File(_)
            | CellValue::Embed(_)
            | CellValue::Source
            | CellValue::SourceFile(_) => {
                let text = self.text_of(value, row);
                let labels: Vec<&str> = if split {
                    text.split(',').map(str::trim).collect()
                } else {
                    vec![text.trim()]
                };
                let mut tag_ids = Vec::new();
                for label in labels.into_iter().filter(|label| !label.is_empty()) {
                    let tag_id = self.tag_for(label);
                    if !tag_ids.contains(&tag_id) {
                        tag_ids.push(tag_id);
                    }
                }
                tag_ids
            }
        }
    }

    fn tag_for(&mut self, label: &str) -> TagId {
        if let Some(tag) = self.to.tag_by_content(label) {
            return tag.id;
        }
        let reused = self.minted.iter().find(|tag| tag.content == label).cloned();
        let tag = match reused {
            Some(tag) => tag,
            None => {
                let tag = Tag::new(label, Color::Default);
                self.minted.push(tag.clone());
                tag
            }
        };
        let tag_id = tag.id;
        self.to.tags.push(tag);
        tag_id
    }
}

fn is_checked_text(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "x" | "1" | "checked"
    )
}
