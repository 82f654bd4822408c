use loom_core::command::{
    ColumnAddArgs, ColumnAddCommand, ColumnDeleteArgs, ColumnDeleteCommand, ColumnReorderArgs,
    ColumnReorderCommand, ColumnSortArgs, ColumnSortCommand, ColumnTypeChangeArgs,
    ColumnTypeChangeCommand, ColumnUpdateArgs, ColumnUpdateCommand,
};
use loom_core::model::filter::TextOperator;
use loom_core::{
    CalculationType, CellType, CellValue, Command, CommandError, EntityKind, Filter, Snapshot,
    SortDir,
};
use uuid::Uuid;

fn delete_by_id(id: Uuid) -> ColumnDeleteCommand {
    ColumnDeleteCommand::new(ColumnDeleteArgs {
        id: Some(id),
        last: false,
    })
    .unwrap()
}

#[test]
fn delete_second_column_cascades_and_undo_restores_exactly() {
    let mut snapshot = Snapshot::with_dimensions(2, 1);
    let second = snapshot.columns[1].id;
    snapshot.rows[0].cells[1].value = CellValue::Text("keep me".to_string());
    snapshot
        .filters
        .push(Filter::text(snapshot.columns[0].id, TextOperator::Contains, "a"));
    snapshot
        .filters
        .push(Filter::text(second, TextOperator::Is, "keep me"));

    let mut command = delete_by_id(second);
    let next = command.execute(&snapshot).unwrap();

    assert_eq!(next.columns.len(), 1);
    assert_eq!(next.rows[0].cells.len(), 1);
    assert!(next.filters.iter().all(|filter| filter.column_id != second));
    assert_eq!(next.filters.len(), 1);
    assert!(next.check_integrity().is_ok());

    let restored = command.undo(&next).unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(restored.columns[1].id, second);
}

#[test]
fn delete_on_single_column_table_is_noop() {
    let snapshot = Snapshot::with_dimensions(1, 3);
    let mut by_id = delete_by_id(snapshot.columns[0].id);
    assert_eq!(by_id.execute(&snapshot).unwrap(), snapshot);

    let mut last = ColumnDeleteCommand::new(ColumnDeleteArgs {
        id: None,
        last: true,
    })
    .unwrap();
    let next = last.execute(&snapshot).unwrap();
    assert_eq!(next, snapshot);
    assert_eq!(last.undo(&next).unwrap(), snapshot);
}

#[test]
fn delete_clamps_frozen_columns_and_undo_restores_them() {
    let mut snapshot = Snapshot::with_dimensions(3, 1);
    snapshot.settings.num_frozen_columns = 3;

    let mut command = ColumnDeleteCommand::new(ColumnDeleteArgs {
        id: None,
        last: true,
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();
    assert_eq!(next.columns.len(), 2);
    assert_eq!(next.settings.num_frozen_columns, 2);

    assert_eq!(command.undo(&next).unwrap(), snapshot);
}

#[test]
fn delete_keeps_frozen_count_already_in_range() {
    let mut snapshot = Snapshot::with_dimensions(3, 0);
    snapshot.settings.num_frozen_columns = 1;

    let mut command = delete_by_id(snapshot.columns[2].id);
    let next = command.execute(&snapshot).unwrap();
    assert_eq!(next.settings.num_frozen_columns, 1);
}

#[test]
fn delete_unknown_column_reports_not_found() {
    let snapshot = Snapshot::with_dimensions(2, 1);
    let missing = Uuid::new_v4();
    match delete_by_id(missing).execute(&snapshot) {
        Err(CommandError::NotFound(err)) => {
            assert_eq!(err.kind, EntityKind::Column);
            assert_eq!(err.id, missing);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn deleting_sorted_column_clears_sort() {
    let mut snapshot = Snapshot::with_dimensions(2, 2);
    snapshot.columns[1].sort_dir = SortDir::Ascending;
    let next = delete_by_id(snapshot.columns[1].id)
        .execute(&snapshot)
        .unwrap();
    assert!(next.sort_column().is_none());
}

#[test]
fn add_inserts_default_cells_at_same_index() {
    let snapshot = Snapshot::with_dimensions(2, 2);
    let mut command = ColumnAddCommand::new(ColumnAddArgs {
        insert_at: Some(1),
        kind: Some(CellType::Checkbox),
        name: Some("Done".to_string()),
    });
    let next = command.execute(&snapshot).unwrap();

    assert_eq!(next.columns[1].id, command.column_id());
    assert_eq!(next.columns[1].name, "Done");
    for row in &next.rows {
        assert_eq!(row.cells[1].column_id, command.column_id());
        assert_eq!(row.cells[1].value, CellValue::Checkbox(false));
    }
    assert!(next.check_integrity().is_ok());
    assert_eq!(command.undo(&next).unwrap(), snapshot);

    let again = command.redo(&snapshot).unwrap();
    assert_eq!(again, next);
}

#[test]
fn reorder_clamps_past_the_end_and_moves_cells() {
    let snapshot = Snapshot::with_dimensions(3, 2);
    let first = snapshot.columns[0].id;
    let mut command = ColumnReorderCommand::new(ColumnReorderArgs {
        id: Some(first),
        to_index: Some(99),
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();

    assert_eq!(next.columns[2].id, first);
    assert_eq!(next.rows[0].cells[2].column_id, first);
    assert!(next.check_integrity().is_ok());
    assert_eq!(command.undo(&next).unwrap(), snapshot);
}

#[test]
fn sort_keeps_at_most_one_sorted_column() {
    let mut snapshot = Snapshot::with_dimensions(3, 1);
    snapshot.columns[0].sort_dir = SortDir::Descending;
    let mut command = ColumnSortCommand::new(ColumnSortArgs {
        id: Some(snapshot.columns[2].id),
        dir: Some(SortDir::Ascending),
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();

    let sorted = next
        .columns
        .iter()
        .filter(|column| column.sort_dir != SortDir::None)
        .count();
    assert_eq!(sorted, 1);
    assert_eq!(next.sort_column().map(|column| column.id), Some(snapshot.columns[2].id));
    assert_eq!(command.undo(&next).unwrap(), snapshot);
}

#[test]
fn update_changes_only_provided_fields() {
    let snapshot = Snapshot::with_dimensions(1, 1);
    let mut command = ColumnUpdateCommand::new(ColumnUpdateArgs {
        id: Some(snapshot.columns[0].id),
        name: Some("Title".to_string()),
        width: Some(300),
        ..ColumnUpdateArgs::default()
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();

    assert_eq!(next.columns[0].name, "Title");
    assert_eq!(next.columns[0].width, 300);
    assert_eq!(next.columns[0].is_visible, snapshot.columns[0].is_visible);
    assert_eq!(command.undo(&next).unwrap(), snapshot);
}

#[test]
fn type_change_is_lossy_forward_and_lossless_backward() {
    let mut snapshot = Snapshot::with_dimensions(1, 3);
    snapshot.columns[0].calculation_type = CalculationType::CountAll;
    for (row, text) in snapshot.rows.iter_mut().zip(["42 apples", "n/a", ""]) {
        row.cells[0].value = CellValue::Text(text.to_string());
    }

    let mut command = ColumnTypeChangeCommand::new(ColumnTypeChangeArgs {
        id: Some(snapshot.columns[0].id),
        kind: Some(CellType::Number),
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();

    assert_eq!(next.columns[0].kind, CellType::Number);
    assert_eq!(next.rows[0].cells[0].value, CellValue::Number(Some(42.0)));
    assert_eq!(next.rows[1].cells[0].value, CellValue::Number(None));
    assert_eq!(command.dropped_values(), 1);
    assert!(next.check_integrity().is_ok());

    assert_eq!(command.undo(&next).unwrap(), snapshot);
}
