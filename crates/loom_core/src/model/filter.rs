//! Filter definitions.
//!
//! # Invariants
//! - `column_id` always references an existing column; removing a column
//!   removes its filters in the same command.
//! - Filters combine with logical AND; there is no grouping.

use crate::model::column::{CellType, ColumnId};
use crate::model::tag::TagId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable filter identifier.
pub type FilterId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperator {
    Is,
    IsNot,
    #[default]
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberOperator {
    #[default]
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperator {
    #[default]
    Is,
    IsNot,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiTagOperator {
    /// Cell holds every listed tag.
    #[default]
    Contains,
    /// Cell holds none of the listed tags.
    DoesNotContain,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxOperator {
    #[default]
    Is,
    IsNot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOperator {
    /// Same calendar day (UTC).
    #[default]
    Is,
    IsBefore,
    IsAfter,
    IsEmpty,
    IsNotEmpty,
}

/// Operator plus comparison value, shaped by the comparison family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterCondition {
    Text {
        operator: TextOperator,
        text: String,
    },
    Number {
        operator: NumberOperator,
        value: Option<f64>,
    },
    Tag {
        operator: TagOperator,
        tag_id: Option<TagId>,
    },
    MultiTag {
        operator: MultiTagOperator,
        tag_ids: Vec<TagId>,
    },
    Checkbox {
        operator: CheckboxOperator,
        value: bool,
    },
    Date {
        operator: DateOperator,
        /// Unix epoch milliseconds.
        value: Option<i64>,
    },
}

impl FilterCondition {
    /// Default condition offered for a new filter on a column of `kind`.
    pub fn default_for(kind: CellType) -> Self {
        match kind {
            CellType::Number => Self::Number {
                operator: NumberOperator::default(),
                value: None,
            },
            CellType::Tag => Self::Tag {
                operator: TagOperator::default(),
                tag_id: None,
            },
            CellType::MultiTag => Self::MultiTag {
                operator: MultiTagOperator::default(),
                tag_ids: Vec::new(),
            },
            CellType::Checkbox => Self::Checkbox {
                operator: CheckboxOperator::default(),
                value: true,
            },
            CellType::Date | CellType::CreationTime | CellType::LastEditedTime => Self::Date {
                operator: DateOperator::default(),
                value: None,
            },
            CellType::Text
            | CellType::File
            | CellType::Embed
            | CellType::Source
            | CellType::SourceFile => Self::Text {
                operator: TextOperator::default(),
                text: String::new(),
            },
        }
    }

    /// Representative cell type of the comparison family.
    pub fn kind(&self) -> CellType {
        match self {
            Self::Text { .. } => CellType::Text,
            Self::Number { .. } => CellType::Number,
            Self::Tag { .. } => CellType::Tag,
            Self::MultiTag { .. } => CellType::MultiTag,
            Self::Checkbox { .. } => CellType::Checkbox,
            Self::Date { .. } => CellType::Date,
        }
    }

    /// Whether this condition can compare cells of a column of `kind`.
    pub fn fits(&self, kind: CellType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&Self::default_for(kind))
    }

    /// Tag ids referenced by the comparison value.
    pub fn tag_ids(&self) -> &[TagId] {
        match self {
            Self::Tag {
                tag_id: Some(tag_id),
                ..
            } => std::slice::from_ref(tag_id),
            Self::MultiTag { tag_ids, .. } => tag_ids.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: FilterId,
    pub column_id: ColumnId,
    pub condition: FilterCondition,
    pub is_enabled: bool,
}

impl Filter {
    /// Creates an enabled filter with a generated id.
    pub fn new(column_id: ColumnId, condition: FilterCondition) -> Self {
        Self::with_id(Uuid::new_v4(), column_id, condition)
    }

    pub fn with_id(id: FilterId, column_id: ColumnId, condition: FilterCondition) -> Self {
        Self {
            id,
            column_id,
            condition,
            is_enabled: true,
        }
    }

    /// Enabled text filter, mostly useful for seeding tables.
    pub fn text(column_id: ColumnId, operator: TextOperator, text: impl Into<String>) -> Self {
        Self::new(
            column_id,
            FilterCondition::Text {
                operator,
                text: text.into(),
            },
        )
    }
}
