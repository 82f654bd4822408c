//! Cell payloads.
//!
//! # Responsibility
//! - Represent one cell value as a tagged union keyed by the owning
//!   column's `CellType`.
//! - Provide pure value helpers (defaults, emptiness, display text, number
//!   and date parsing) shared by commands and derived views.
//!
//! # Invariants
//! - `CellValue::kind()` equals the owning column's `kind`.
//! - Derived variants (`CreationTime`, `LastEditedTime`, `Source`) carry no
//!   payload; their value is read from the owning row.

use crate::model::column::{CellType, Column, ColumnId, DateFormat};
use crate::model::row::Row;
use crate::model::source::Source;
use crate::model::tag::TagId;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static NUMBER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)")
        .expect("valid number prefix regex")
});

/// Stable cell identifier.
pub type CellId = Uuid;

/// Payload of one cell. The variant is selected by the column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(Option<f64>),
    Tag(Option<TagId>),
    /// Ordered tag references; order is the attach order.
    MultiTag(Vec<TagId>),
    Checkbox(bool),
    /// Unix epoch milliseconds.
    Date(Option<i64>),
    CreationTime,
    LastEditedTime,
    /// Vault-relative file path.
    File(String),
    /// Embedded URL or path.
    Embed(String),
    Source,
    SourceFile(String),
}

impl CellValue {
    /// Empty value for a freshly created cell of `kind`.
    pub fn default_for(kind: CellType) -> Self {
        match kind {
            CellType::Text => Self::Text(String::new()),
            CellType::Number => Self::Number(None),
            CellType::Tag => Self::Tag(None),
            CellType::MultiTag => Self::MultiTag(Vec::new()),
            CellType::Checkbox => Self::Checkbox(false),
            CellType::Date => Self::Date(None),
            CellType::CreationTime => Self::CreationTime,
            CellType::LastEditedTime => Self::LastEditedTime,
            CellType::File => Self::File(String::new()),
            CellType::Embed => Self::Embed(String::new()),
            CellType::Source => Self::Source,
            CellType::SourceFile => Self::SourceFile(String::new()),
        }
    }

    /// Column type this payload belongs to.
    pub fn kind(&self) -> CellType {
        match self {
            Self::Text(_) => CellType::Text,
            Self::Number(_) => CellType::Number,
            Self::Tag(_) => CellType::Tag,
            Self::MultiTag(_) => CellType::MultiTag,
            Self::Checkbox(_) => CellType::Checkbox,
            Self::Date(_) => CellType::Date,
            Self::CreationTime => CellType::CreationTime,
            Self::LastEditedTime => CellType::LastEditedTime,
            Self::File(_) => CellType::File,
            Self::Embed(_) => CellType::Embed,
            Self::Source => CellType::Source,
            Self::SourceFile(_) => CellType::SourceFile,
        }
    }

    /// Whether the cell holds content entered by the user.
    ///
    /// Derived variants and unchecked checkboxes hold none.
    pub fn has_user_content(&self) -> bool {
        match self {
            Self::Text(text) | Self::File(text) | Self::Embed(text) | Self::SourceFile(text) => {
                !text.trim().is_empty()
            }
            Self::Number(value) => value.is_some(),
            Self::Tag(tag_id) => tag_id.is_some(),
            Self::MultiTag(tag_ids) => !tag_ids.is_empty(),
            Self::Checkbox(checked) => *checked,
            Self::Date(value) => value.is_some(),
            Self::CreationTime | Self::LastEditedTime | Self::Source => false,
        }
    }

    /// Tag ids referenced by this payload, in order.
    pub fn tag_ids(&self) -> &[TagId] {
        match self {
            Self::Tag(Some(tag_id)) => std::slice::from_ref(tag_id),
            Self::MultiTag(tag_ids) => tag_ids.as_slice(),
            _ => &[],
        }
    }

    /// Whether the cell is empty for calculation and filter purposes.
    ///
    /// Derived values are resolved against `row`; a Source cell is empty when
    /// the row has no source.
    pub fn is_empty_in(&self, row: &Row) -> bool {
        match self {
            Self::CreationTime | Self::LastEditedTime => false,
            Self::Source => row.source_id.is_none(),
            Self::Checkbox(_) => false,
            other => !other.has_user_content(),
        }
    }

    /// Plain display text used by search, type conversion and text sorting.
    ///
    /// Tags resolve to their labels (multi-tags joined by `", "`), dates and
    /// timestamps use the column's `DateFormat`.
    pub fn display_text(&self, column: &Column, row: &Row, sources: &[Source]) -> String {
        match self {
            Self::Text(text) | Self::File(text) | Self::Embed(text) | Self::SourceFile(text) => {
                text.clone()
            }
            Self::Number(value) => value.map(format_number).unwrap_or_default(),
            Self::Tag(_) | Self::MultiTag(_) => self
                .tag_ids()
                .iter()
                .filter_map(|tag_id| column.tag(*tag_id))
                .map(|tag| tag.content.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Checkbox(checked) => checked.to_string(),
            Self::Date(value) => value
                .and_then(|millis| format_timestamp(millis, column.date_format))
                .unwrap_or_default(),
            Self::CreationTime => {
                format_timestamp(row.creation_time, column.date_format).unwrap_or_default()
            }
            Self::LastEditedTime => {
                format_timestamp(row.last_edited_time, column.date_format).unwrap_or_default()
            }
            Self::Source => row
                .source_id
                .and_then(|source_id| sources.iter().find(|source| source.id == source_id))
                .map(|source| source.content.clone())
                .unwrap_or_default(),
        }
    }
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    /// Back-reference to the owning column.
    pub column_id: ColumnId,
    pub value: CellValue,
}

impl Cell {
    /// Creates a cell with a generated id.
    pub fn new(column_id: ColumnId, value: CellValue) -> Self {
        Self {
            id: Uuid::new_v4(),
            column_id,
            value,
        }
    }

    /// Creates an empty cell for `column`.
    pub fn default_for(column: &Column) -> Self {
        Self::new(column.id, CellValue::default_for(column.kind))
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Parses the numeric prefix of `text` (`"12.5kg"` -> `12.5`).
///
/// Returns `None` when the text does not start with a number.
pub fn parse_number_prefix(text: &str) -> Option<f64> {
    NUMBER_PREFIX_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Formats epoch milliseconds as a UTC date using `format`.
pub fn format_timestamp(millis: i64, format: DateFormat) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|datetime| datetime.format(format.pattern()).to_string())
}

/// Parses a date written in `format` or ISO `YYYY-MM-DD` into epoch
/// milliseconds at UTC midnight.
pub fn parse_date(text: &str, format: DateFormat) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    [format.pattern(), "%Y-%m-%d"]
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(trimmed, pattern).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp_millis())
}

/// Day bucket of a timestamp, used for same-day date comparison.
pub fn day_of(millis: i64) -> i64 {
    millis.div_euclid(MILLIS_PER_DAY)
}

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
