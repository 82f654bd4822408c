//! Filter evaluation and free-text search.
//!
//! A row passes when it satisfies every enabled filter. Each condition is
//! compared against the row's cell in the filter's column using that
//! column type's semantics:
//!
//! - text: case-insensitive equality, containment and affixes
//! - number: numeric comparison
//! - tag / multi-tag: set membership
//! - checkbox: boolean equality
//! - date and row timestamps: same UTC day, before, after
//!
//! A condition without a comparison value (blank text, no number, no tag,
//! no date) passes. Conditions that do not fit the column type, and cells
//! whose value needs context the evaluator does not have (row sources),
//! pass as well.

use crate::model::cell::{day_of, Cell, CellValue};
use crate::model::column::Column;
use crate::model::filter::{
    CheckboxOperator, DateOperator, Filter, FilterCondition, MultiTagOperator, NumberOperator,
    TagOperator, TextOperator,
};
use crate::model::row::Row;
use crate::model::snapshot::Snapshot;

/// Returns whether `row` satisfies all enabled `filters`.
pub fn matches(row: &Row, filters: &[Filter], columns: &[Column]) -> bool {
    filters
        .iter()
        .filter(|filter| filter.is_enabled)
        .all(|filter| matches_filter(row, filter, columns))
}

/// Rows of `snapshot` passing `filters`, in document order.
pub fn filtered_rows<'a>(snapshot: &'a Snapshot, filters: &[Filter]) -> Vec<&'a Row> {
    snapshot
        .rows
        .iter()
        .filter(|row| matches(row, filters, &snapshot.columns))
        .collect()
}

/// Keeps the rows whose visible cells contain `text`, case-insensitively.
///
/// Blank search text keeps every row.
pub fn search_rows<'a>(snapshot: &Snapshot, rows: Vec<&'a Row>, text: &str) -> Vec<&'a Row> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            snapshot
                .columns
                .iter()
                .filter(|column| column.is_visible)
                .filter_map(|column| row.cell(column.id).map(|cell| (column, cell)))
                .any(|(column, cell)| {
                    cell.value
                        .display_text(column, row, &snapshot.sources)
                        .to_lowercase()
                        .contains(&needle)
                })
        })
        .collect()
}

fn matches_filter(row: &Row, filter: &Filter, columns: &[Column]) -> bool {
    let Some(column) = columns.iter().find(|column| column.id == filter.column_id) else {
        return true;
    };
    let Some(cell) = row.cell(column.id) else {
        return true;
    };
    if !filter.condition.fits(column.kind) {
        return true;
    }

    match &filter.condition {
        FilterCondition::Text { operator, text } => match_text(row, cell, *operator, text),
        FilterCondition::Number { operator, value } => match_number(row, cell, *operator, *value),
        FilterCondition::Tag { operator, tag_id } => match *operator {
            TagOperator::IsEmpty => cell.value.is_empty_in(row),
            TagOperator::IsNotEmpty => !cell.value.is_empty_in(row),
            TagOperator::Is => tag_id.map_or(true, |tag_id| cell.value.tag_ids() == [tag_id]),
            TagOperator::IsNot => {
                tag_id.map_or(true, |tag_id| !cell.value.tag_ids().contains(&tag_id))
            }
        },
        FilterCondition::MultiTag { operator, tag_ids } => {
            let held = cell.value.tag_ids();
            match *operator {
                MultiTagOperator::IsEmpty => cell.value.is_empty_in(row),
                MultiTagOperator::IsNotEmpty => !cell.value.is_empty_in(row),
                MultiTagOperator::Contains => tag_ids.iter().all(|tag_id| held.contains(tag_id)),
                MultiTagOperator::DoesNotContain => {
                    !tag_ids.iter().any(|tag_id| held.contains(tag_id))
                }
            }
        }
        FilterCondition::Checkbox { operator, value } => {
            let CellValue::Checkbox(checked) = cell.value else {
                return true;
            };
            match *operator {
                CheckboxOperator::Is => checked == *value,
                CheckboxOperator::IsNot => checked != *value,
            }
        }
        FilterCondition::Date { operator, value } => match_date(row, cell, *operator, *value),
    }
}

fn match_text(row: &Row, cell: &Cell, operator: TextOperator, text: &str) -> bool {
    let held = match &cell.value {
        CellValue::Text(held)
        | CellValue::File(held)
        | CellValue::Embed(held)
        | CellValue::SourceFile(held) => held,
        _ => return true,
    };

    match operator {
        TextOperator::IsEmpty => return cell.value.is_empty_in(row),
        TextOperator::IsNotEmpty => return !cell.value.is_empty_in(row),
        _ => {}
    }

    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let held = held.trim().to_lowercase();
    match operator {
        TextOperator::Is => held == needle,
        TextOperator::IsNot => held != needle,
        TextOperator::Contains => held.contains(&needle),
        TextOperator::DoesNotContain => !held.contains(&needle),
        TextOperator::StartsWith => held.starts_with(&needle),
        TextOperator::EndsWith => held.ends_with(&needle),
        TextOperator::IsEmpty | TextOperator::IsNotEmpty => true,
    }
}

fn match_number(row: &Row, cell: &Cell, operator: NumberOperator, value: Option<f64>) -> bool {
    let CellValue::Number(held) = cell.value else {
        return true;
    };

    match operator {
        NumberOperator::IsEmpty => return cell.value.is_empty_in(row),
        NumberOperator::IsNotEmpty => return !cell.value.is_empty_in(row),
        _ => {}
    }

    let Some(value) = value else {
        return true;
    };
    let Some(held) = held else {
        return operator == NumberOperator::NotEqual;
    };
    match operator {
        NumberOperator::Equal => held == value,
        NumberOperator::NotEqual => held != value,
        NumberOperator::Less => held < value,
        NumberOperator::LessOrEqual => held <= value,
        NumberOperator::Greater => held > value,
        NumberOperator::GreaterOrEqual => held >= value,
        NumberOperator::IsEmpty | NumberOperator::IsNotEmpty => true,
    }
}

fn match_date(row: &Row, cell: &Cell, operator: DateOperator, value: Option<i64>) -> bool {
    let held = match cell.value {
        CellValue::Date(held) => held,
        CellValue::CreationTime => Some(row.creation_time),
        CellValue::LastEditedTime => Some(row.last_edited_time),
        _ => return true,
    };

    match operator {
        DateOperator::IsEmpty => return held.is_none(),
        DateOperator::IsNotEmpty => return held.is_some(),
        _ => {}
    }

    let Some(value) = value else {
        return true;
    };
    let Some(held) = held else {
        return false;
    };
    let (held, value) = (day_of(held), day_of(value));
    match operator {
        DateOperator::Is => held == value,
        DateOperator::IsBefore => held < value,
        DateOperator::IsAfter => held > value,
        DateOperator::IsEmpty | DateOperator::IsNotEmpty => true,
    }
}

#[cfg(test)]
mod tests {
    use super::{filtered_rows, matches, search_rows};
    use crate::model::cell::{Cell, CellValue};
    use crate::model::column::{CellType, Column};
    use crate::model::filter::{
        DateOperator, Filter, FilterCondition, NumberOperator, TextOperator,
    };
    use crate::model::row::Row;
    use crate::model::snapshot::Snapshot;

    fn text_table(values: &[&str]) -> Snapshot {
        let mut snapshot = Snapshot::with_dimensions(1, 0);
        let column_id = snapshot.columns[0].id;
        for value in values {
            snapshot.rows.push(Row::new(
                vec![Cell::new(column_id, CellValue::Text(value.to_string()))],
                0,
            ));
        }
        snapshot
    }

    #[test]
    fn text_contains_is_case_insensitive() {
        let snapshot = text_table(&["Alpha", "beta", "ALPHABET"]);
        let filters = vec![Filter::text(
            snapshot.columns[0].id,
            TextOperator::Contains,
            "alpha",
        )];
        let rows = filtered_rows(&snapshot, &filters);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, snapshot.rows[2].id);
    }

    #[test]
    fn blank_comparison_and_disabled_filters_pass() {
        let snapshot = text_table(&["one", ""]);
        let column_id = snapshot.columns[0].id;
        let mut disabled = Filter::text(column_id, TextOperator::Is, "nothing");
        disabled.is_enabled = false;
        let filters = vec![Filter::text(column_id, TextOperator::StartsWith, "  "), disabled];
        assert_eq!(filtered_rows(&snapshot, &filters).len(), 2);
    }

    #[test]
    fn filters_combine_with_and() {
        let snapshot = text_table(&["red apple", "red car", "green apple"]);
        let column_id = snapshot.columns[0].id;
        let filters = vec![
            Filter::text(column_id, TextOperator::Contains, "red"),
            Filter::text(column_id, TextOperator::EndsWith, "apple"),
        ];
        let rows = filtered_rows(&snapshot, &filters);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, snapshot.rows[0].id);
    }

    #[test]
    fn mismatched_condition_is_permissive() {
        let snapshot = text_table(&["x"]);
        let filter = Filter::new(
            snapshot.columns[0].id,
            FilterCondition::Number {
                operator: NumberOperator::Greater,
                value: Some(10.0),
            },
        );
        assert!(matches(&snapshot.rows[0], &[filter], &snapshot.columns));
    }

    #[test]
    fn number_and_date_comparisons() {
        let number = Column::new(CellType::Number, "Price");
        let date = Column::new(CellType::Date, "Due");
        let day = 86_400_000_i64;
        let row = Row::new(
            vec![
                Cell::new(number.id, CellValue::Number(Some(12.5))),
                Cell::new(date.id, CellValue::Date(Some(10 * day + 3_600_000))),
            ],
            0,
        );
        let columns = vec![number.clone(), date.clone()];

        let greater = Filter::new(
            number.id,
            FilterCondition::Number {
                operator: NumberOperator::GreaterOrEqual,
                value: Some(12.5),
            },
        );
        let same_day = Filter::new(
            date.id,
            FilterCondition::Date {
                operator: DateOperator::Is,
                value: Some(10 * day),
            },
        );
        let before = Filter::new(
            date.id,
            FilterCondition::Date {
                operator: DateOperator::IsBefore,
                value: Some(10 * day),
            },
        );
        assert!(matches(&row, &[greater.clone(), same_day], &columns));
        assert!(!matches(&row, &[greater, before], &columns));
    }

    #[test]
    fn search_skips_hidden_columns() {
        let mut snapshot = text_table(&["needle", "hay"]);
        let rows = search_rows(&snapshot, snapshot.rows.iter().collect(), "NEED");
        assert_eq!(rows.len(), 1);

        snapshot.columns[0].is_visible = false;
        let rows = search_rows(&snapshot, snapshot.rows.iter().collect(), "need");
        assert!(rows.is_empty());
    }
}
