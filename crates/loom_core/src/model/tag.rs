//! Tag definitions owned by Tag/MultiTag columns.
//!
//! # Invariants
//! - A column exclusively owns its tags; cells only reference tag ids.
//! - Tag ids are unique within their owning column.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tag identifier, scoped to its owning column.
pub type TagId = Uuid;

/// Display color of a tag chip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
}

/// One selectable label of a Tag/MultiTag column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Label text shown in the cell.
    pub content: String,
    pub color: Color,
}

impl Tag {
    /// Creates a tag with a generated id.
    pub fn new(content: impl Into<String>, color: Color) -> Self {
        Self::with_id(Uuid::new_v4(), content, color)
    }

    pub fn with_id(id: TagId, content: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            content: content.into(),
            color,
        }
    }
}
