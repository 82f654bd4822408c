//! Column schema.
//!
//! # Responsibility
//! - Declare the cell type every cell of the column must carry.
//! - Hold per-type display options and the column's tag set.
//!
//! # Invariants
//! - `id` is unique across the table and referenced by exactly one cell per row.
//! - `tags` is only meaningful when `kind` is `Tag` or `MultiTag`.
//! - At most one column of a table has `sort_dir != SortDir::None`.

use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable column identifier.
pub type ColumnId = Uuid;

/// Name given to columns created without an explicit name.
pub const DEFAULT_COLUMN_NAME: &str = "New Column";
/// Column width in pixels for new columns.
pub const DEFAULT_COLUMN_WIDTH: u32 = 140;

/// Declared type of a column; selects the payload variant of its cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    #[default]
    Text,
    Number,
    Tag,
    MultiTag,
    Checkbox,
    Date,
    /// Derived from the row's creation timestamp.
    CreationTime,
    /// Derived from the row's last-edited timestamp.
    LastEditedTime,
    File,
    Embed,
    /// Derived from the row's source reference.
    Source,
    SourceFile,
}

impl CellType {
    pub const ALL: [CellType; 12] = [
        Self::Text,
        Self::Number,
        Self::Tag,
        Self::MultiTag,
        Self::Checkbox,
        Self::Date,
        Self::CreationTime,
        Self::LastEditedTime,
        Self::File,
        Self::Embed,
        Self::Source,
        Self::SourceFile,
    ];

    /// Stable string id, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Tag => "tag",
            Self::MultiTag => "multi_tag",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::CreationTime => "creation_time",
            Self::LastEditedTime => "last_edited_time",
            Self::File => "file",
            Self::Embed => "embed",
            Self::Source => "source",
            Self::SourceFile => "source_file",
        }
    }

    /// Whether cells of this type reference the column's tag set.
    pub fn has_tags(self) -> bool {
        matches!(self, Self::Tag | Self::MultiTag)
    }

    /// Whether the cell value is computed from row metadata instead of stored.
    pub fn is_derived(self) -> bool {
        matches!(self, Self::CreationTime | Self::LastEditedTime | Self::Source)
    }
}

/// Sort direction carried by at most one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    #[default]
    None,
    Ascending,
    Descending,
}

/// Currency symbol used by `NumberFormat::Currency`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyType {
    #[default]
    UnitedStatesDollar,
    Euro,
    BritishPound,
    JapaneseYen,
    CanadianDollar,
    AustralianDollar,
    SwissFranc,
    ChineseYuan,
    IndianRupee,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    #[default]
    Number,
    Currency,
}

/// Display/parse format for Date and timestamp columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    #[default]
    MmDdYyyy,
    DdMmYyyy,
    YyyyMmDd,
    /// Long form, e.g. `March 4, 2024`.
    Full,
}

impl DateFormat {
    /// `chrono` format pattern used for display and parsing.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::MmDdYyyy => "%m/%d/%Y",
            Self::DdMmYyyy => "%d/%m/%Y",
            Self::YyyyMmDd => "%Y/%m/%d",
            Self::Full => "%B %-d, %Y",
        }
    }
}

/// Footer aggregate computed by the calculation row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    #[default]
    None,
    CountAll,
    CountValues,
    CountUnique,
    CountEmpty,
    CountNotEmpty,
    PercentEmpty,
    PercentNotEmpty,
    Sum,
    Average,
    Median,
    Min,
    Max,
    Range,
}

impl CalculationType {
    /// Whether the aggregate only applies to Number columns.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Sum | Self::Average | Self::Median | Self::Min | Self::Max | Self::Range
        )
    }
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    /// Serialized as `type` to match the document schema.
    #[serde(rename = "type")]
    pub kind: CellType,
    pub is_visible: bool,
    /// Width in pixels.
    pub width: u32,
    pub currency: CurrencyType,
    pub date_format: DateFormat,
    pub number_format: NumberFormat,
    pub number_prefix: String,
    pub number_suffix: String,
    /// Ordered tag set, meaningful for Tag/MultiTag columns.
    pub tags: Vec<Tag>,
    pub calculation_type: CalculationType,
    pub sort_dir: SortDir,
}

impl Column {
    /// Creates a visible, unsorted column with a generated id.
    pub fn new(kind: CellType, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, name)
    }

    pub fn with_id(id: ColumnId, kind: CellType, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            is_visible: true,
            width: DEFAULT_COLUMN_WIDTH,
            currency: CurrencyType::default(),
            date_format: DateFormat::default(),
            number_format: NumberFormat::default(),
            number_prefix: String::new(),
            number_suffix: String::new(),
            tags: Vec::new(),
            calculation_type: CalculationType::default(),
            sort_dir: SortDir::default(),
        }
    }

    pub fn tag(&self, tag_id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == tag_id)
    }

    pub fn tag_index(&self, tag_id: TagId) -> Option<usize> {
        self.tags.iter().position(|tag| tag.id == tag_id)
    }

    /// Finds a tag by its exact label.
    pub fn tag_by_content(&self, content: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.content == content)
    }

    pub fn is_sorted(&self) -> bool {
        self.sort_dir != SortDir::None
    }
}
