//! Calculation-row aggregates.
//!
//! Counting aggregates apply to every column type. Numeric aggregates
//! (sum, average, median, min, max, range) apply to Number columns only and
//! ignore empty cells.

use crate::model::cell::CellValue;
use crate::model::column::{CalculationType, CellType, ColumnId};
use crate::model::error::NotFoundError;
use crate::model::row::Row;
use crate::model::snapshot::Snapshot;
use serde::Serialize;
use std::collections::HashSet;

/// Result of one column's calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CalculationValue {
    /// No calculation selected, or nothing to aggregate.
    None,
    Count(usize),
    /// Percentage in `0.0..=100.0`.
    Percent(f64),
    Number(f64),
}

/// Aggregates `rows` over the column `column_id` using its calculation type.
///
/// # Errors
/// - `NotFoundError` when the column does not exist.
pub fn calculate(
    snapshot: &Snapshot,
    rows: &[&Row],
    column_id: ColumnId,
) -> Result<CalculationValue, NotFoundError> {
    let column = snapshot.column(column_id)?;
    let cells = rows
        .iter()
        .filter_map(|row| row.cell(column_id).map(|cell| (*row, &cell.value)))
        .collect::<Vec<_>>();
    let empty = cells
        .iter()
        .filter(|(row, value)| value.is_empty_in(row))
        .count();
    let total = rows.len();

    let value = match column.calculation_type {
        CalculationType::None => CalculationValue::None,
        CalculationType::CountAll => CalculationValue::Count(total),
        CalculationType::CountValues => CalculationValue::Count(
            cells
                .iter()
                .map(|(row, value)| match value {
                    CellValue::MultiTag(tag_ids) => tag_ids.len(),
                    _ if value.is_empty_in(row) => 0,
                    _ => 1,
                })
                .sum(),
        ),
        CalculationType::CountUnique => {
            let unique = cells
                .iter()
                .filter(|(row, value)| !value.is_empty_in(row))
                .flat_map(|(row, value)| match value {
                    CellValue::Tag(_) | CellValue::MultiTag(_) => value
                        .tag_ids()
                        .iter()
                        .map(|tag_id| tag_id.to_string())
                        .collect::<Vec<_>>(),
                    _ => vec![value
                        .display_text(column, row, &snapshot.sources)
                        .trim()
                        .to_lowercase()],
                })
                .collect::<HashSet<_>>();
            CalculationValue::Count(unique.len())
        }
        CalculationType::CountEmpty => CalculationValue::Count(empty),
        CalculationType::CountNotEmpty => CalculationValue::Count(total - empty),
        CalculationType::PercentEmpty => percent(empty, total),
        CalculationType::PercentNotEmpty => percent(total - empty, total),
        numeric => {
            if column.kind != CellType::Number {
                return Ok(CalculationValue::None);
            }
            let numbers = cells
                .iter()
                .filter_map(|(_, value)| match value {
                    CellValue::Number(number) => *number,
                    _ => None,
                })
                .collect::<Vec<_>>();
            aggregate(numeric, numbers)
        }
    };
    Ok(value)
}

fn percent(part: usize, total: usize) -> CalculationValue {
    if total == 0 {
        return CalculationValue::Percent(0.0);
    }
    CalculationValue::Percent(part as f64 * 100.0 / total as f64)
}

fn aggregate(calculation: CalculationType, mut numbers: Vec<f64>) -> CalculationValue {
    if numbers.is_empty() {
        return CalculationValue::None;
    }
    numbers.sort_by(f64::total_cmp);
    let sum = numbers.iter().sum::<f64>();
    let min = numbers[0];
    let max = numbers[numbers.len() - 1];

    let value = match calculation {
        CalculationType::Sum => sum,
        CalculationType::Average => sum / numbers.len() as f64,
        CalculationType::Median => {
            let middle = numbers.len() / 2;
            if numbers.len() % 2 == 0 {
                (numbers[middle - 1] + numbers[middle]) / 2.0
            } else {
                numbers[middle]
            }
        }
        CalculationType::Min => min,
        CalculationType::Max => max,
        CalculationType::Range => max - min,
        _ => return CalculationValue::None,
    };
    CalculationValue::Number(value)
}

#[cfg(test)]
mod tests {
    use super::{calculate, CalculationValue};
    use crate::model::cell::{Cell, CellValue};
    use crate::model::column::{CalculationType, CellType, Column};
    use crate::model::row::Row;
    use crate::model::snapshot::Snapshot;

    fn scores(values: &[Option<f64>], calculation: CalculationType) -> CalculationValue {
        let mut snapshot = Snapshot::with_dimensions(1, 0);
        let mut column = Column::new(CellType::Number, "Score");
        column.calculation_type = calculation;
        snapshot.columns = vec![column.clone()];
        snapshot.rows = values
            .iter()
            .map(|value| Row::new(vec![Cell::new(column.id, CellValue::Number(*value))], 0))
            .collect();
        let rows = snapshot.rows.iter().collect::<Vec<_>>();
        calculate(&snapshot, &rows, column.id).unwrap()
    }

    #[test]
    fn numeric_aggregates_skip_empty_cells() {
        let values = [Some(4.0), None, Some(1.0), Some(7.0), Some(2.0)];
        assert_eq!(
            scores(&values, CalculationType::Sum),
            CalculationValue::Number(14.0)
        );
        assert_eq!(
            scores(&values, CalculationType::Median),
            CalculationValue::Number(3.0)
        );
        assert_eq!(
            scores(&values, CalculationType::Range),
            CalculationValue::Number(6.0)
        );
        assert_eq!(
            scores(&values, CalculationType::PercentEmpty),
            CalculationValue::Percent(20.0)
        );
        assert_eq!(scores(&[None], CalculationType::Average), CalculationValue::None);
    }

    #[test]
    fn counts_apply_to_text_columns() {
        let mut snapshot = Snapshot::with_dimensions(1, 0);
        let column_id = snapshot.columns[0].id;
        for text in ["a", "A", "", "b"] {
            snapshot.rows.push(Row::new(
                vec![Cell::new(column_id, CellValue::Text(text.to_string()))],
                0,
            ));
        }
        snapshot.columns[0].calculation_type = CalculationType::CountUnique;
        let rows = snapshot.rows.iter().collect::<Vec<_>>();

        let unique = calculate(&snapshot, &rows, column_id);
        assert_eq!(unique, Ok(CalculationValue::Count(2)));
    }
}
