//! Lookup and integrity errors for the document model.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Entity collection a lookup was performed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Column,
    Row,
    Cell,
    Tag,
    Filter,
    Source,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Row => "row",
            Self::Cell => "cell",
            Self::Tag => "tag",
            Self::Filter => "filter",
            Self::Source => "source",
        }
    }
}

/// A referenced entity id is absent from the snapshot it was resolved in.
///
/// This is a contract violation by the caller (stale id or upstream bug),
/// not a recoverable user error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFoundError {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl NotFoundError {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn column(id: Uuid) -> Self {
        Self::new(EntityKind::Column, id)
    }

    pub fn row(id: Uuid) -> Self {
        Self::new(EntityKind::Row, id)
    }

    pub fn cell(id: Uuid) -> Self {
        Self::new(EntityKind::Cell, id)
    }

    pub fn tag(id: Uuid) -> Self {
        Self::new(EntityKind::Tag, id)
    }

    pub fn filter(id: Uuid) -> Self {
        Self::new(EntityKind::Filter, id)
    }

    pub fn source(id: Uuid) -> Self {
        Self::new(EntityKind::Source, id)
    }
}

impl Display for NotFoundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.kind.as_str(), self.id)
    }
}

impl Error for NotFoundError {}

/// Cross-entity invariant violated by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// The table has no columns.
    NoColumns,
    /// Two entities of the same kind share an id.
    DuplicateId { kind: EntityKind, id: Uuid },
    /// A row does not hold exactly one cell per column.
    CellCountMismatch {
        row_id: Uuid,
        expected: usize,
        actual: usize,
    },
    /// The cell at `index` does not belong to the column at `index`.
    CellColumnMismatch { row_id: Uuid, index: usize },
    /// A cell payload variant differs from its column's type.
    CellKindMismatch { row_id: Uuid, column_id: Uuid },
    /// A cell references a tag its column does not own.
    DanglingTag { row_id: Uuid, tag_id: Uuid },
    /// A filter references a column that does not exist.
    DanglingFilter { filter_id: Uuid, column_id: Uuid },
    /// A row references a source that does not exist.
    DanglingSource { row_id: Uuid, source_id: Uuid },
    /// More than one column carries a sort direction.
    MultipleSortColumns,
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoColumns => write!(f, "table must have at least one column"),
            Self::DuplicateId { kind, id } => {
                write!(f, "duplicate {} id: {id}", kind.as_str())
            }
            Self::CellCountMismatch {
                row_id,
                expected,
                actual,
            } => write!(
                f,
                "row {row_id} holds {actual} cells, expected {expected}"
            ),
            Self::CellColumnMismatch { row_id, index } => {
                write!(f, "row {row_id} cell {index} is out of column order")
            }
            Self::CellKindMismatch { row_id, column_id } => write!(
                f,
                "row {row_id} cell for column {column_id} has the wrong payload type"
            ),
            Self::DanglingTag { row_id, tag_id } => {
                write!(f, "row {row_id} references unknown tag {tag_id}")
            }
            Self::DanglingFilter {
                filter_id,
                column_id,
            } => write!(
                f,
                "filter {filter_id} references unknown column {column_id}"
            ),
            Self::DanglingSource { row_id, source_id } => {
                write!(f, "row {row_id} references unknown source {source_id}")
            }
            Self::MultipleSortColumns => write!(f, "more than one column is sorted"),
        }
    }
}

impl Error for IntegrityError {}

#[cfg(test)]
mod tests {
    use super::{EntityKind, NotFoundError};
    use uuid::Uuid;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let id = Uuid::new_v4();
        let err = NotFoundError::row(id);
        assert_eq!(err.kind, EntityKind::Row);
        assert_eq!(err.to_string(), format!("row not found: {id}"));
    }
}
