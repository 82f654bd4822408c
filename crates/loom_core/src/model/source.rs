//! Row sources (where imported rows originate).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable source identifier.
pub type SourceId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Rows come from the notes of a folder.
    #[default]
    Folder,
    /// Rows come from notes whose frontmatter matches a query.
    Frontmatter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    #[serde(rename = "type")]
    pub kind: SourceType,
    /// Folder path or query text.
    pub content: String,
}

impl Source {
    pub fn new(kind: SourceType, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
        }
    }
}
