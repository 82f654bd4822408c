//! Row ordering by the sorted column.
//!
//! # Invariants
//! - The order is total and stable: ties keep their input order.
//! - Empty cells sort last in both directions; the direction only flips
//!   the order among non-empty values.

use crate::model::cell::CellValue;
use crate::model::column::{Column, SortDir};
use crate::model::row::Row;
use crate::model::snapshot::Snapshot;
use crate::model::source::Source;
use std::cmp::Ordering;

/// Rows of `snapshot` in sorted order, or document order when no column
/// is sorted.
pub fn sorted_rows(snapshot: &Snapshot) -> Vec<&Row> {
    let rows = snapshot.rows.iter().collect();
    match snapshot.sort_column() {
        Some(column) => sort_rows(rows, column, &snapshot.sources),
        None => rows,
    }
}

/// Orders `rows` by their cells in `column`, following `column.sort_dir`.
pub fn sort_rows<'a>(rows: Vec<&'a Row>, column: &Column, sources: &[Source]) -> Vec<&'a Row> {
    if column.sort_dir == SortDir::None {
        return rows;
    }

    let mut keyed = rows
        .into_iter()
        .map(|row| (SortKey::of(row, column, sources), row))
        .collect::<Vec<_>>();
    keyed.sort_by(|(left, _), (right, _)| compare(left, right, column.sort_dir));
    keyed.into_iter().map(|(_, row)| row).collect()
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Time(i64),
    /// Tag labels in cell order.
    Labels(Vec<String>),
}

impl SortKey {
    fn of(row: &Row, column: &Column, sources: &[Source]) -> Self {
        let Some(cell) = row.cell(column.id) else {
            return Self::Empty;
        };
        let key = match &cell.value {
            CellValue::Text(text)
            | CellValue::File(text)
            | CellValue::Embed(text)
            | CellValue::SourceFile(text) => Self::Text(text.trim().to_lowercase()),
            CellValue::Source => {
                Self::Text(cell.value.display_text(column, row, sources).to_lowercase())
            }
            CellValue::Number(value) => value.map_or(Self::Empty, Self::Number),
            CellValue::Checkbox(checked) => Self::Bool(*checked),
            CellValue::Date(value) => value.map_or(Self::Empty, Self::Time),
            CellValue::CreationTime => Self::Time(row.creation_time),
            CellValue::LastEditedTime => Self::Time(row.last_edited_time),
            CellValue::Tag(_) | CellValue::MultiTag(_) => Self::Labels(
                cell.value
                    .tag_ids()
                    .iter()
                    .filter_map(|tag_id| column.tag(*tag_id))
                    .map(|tag| tag.content.to_lowercase())
                    .collect(),
            ),
        };

        match &key {
            Self::Text(text) if text.is_empty() => Self::Empty,
            Self::Labels(labels) if labels.is_empty() => Self::Empty,
            _ => key,
        }
    }
}

fn compare(left: &SortKey, right: &SortKey, dir: SortDir) -> Ordering {
    let ordering = match (left, right) {
        (SortKey::Empty, SortKey::Empty) => return Ordering::Equal,
        (SortKey::Empty, _) => return Ordering::Greater,
        (_, SortKey::Empty) => return Ordering::Less,
        (SortKey::Text(left), SortKey::Text(right)) => left.cmp(right),
        (SortKey::Number(left), SortKey::Number(right)) => left.total_cmp(right),
        (SortKey::Bool(left), SortKey::Bool(right)) => left.cmp(right),
        (SortKey::Time(left), SortKey::Time(right)) => left.cmp(right),
        (SortKey::Labels(left), SortKey::Labels(right)) => left.cmp(right),
        _ => Ordering::Equal,
    };

    match dir {
        SortDir::Descending => ordering.reverse(),
        SortDir::Ascending | SortDir::None => ordering,
    }
}
