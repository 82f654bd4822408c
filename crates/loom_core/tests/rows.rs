use loom_core::command::{
    RowAddArgs, RowAddCommand, RowDeleteArgs, RowDeleteCommand, RowReorderArgs, RowReorderCommand,
    SourceAddArgs, SourceAddCommand,
};
use loom_core::{CellType, CellValue, Column, Command, CommandError, Snapshot};
use uuid::Uuid;

#[test]
fn delete_last_reinserts_at_original_index_on_undo() {
    let snapshot = Snapshot::with_dimensions(2, 3);
    let last_id = snapshot.rows[2].id;
    let mut command = RowDeleteCommand::new(RowDeleteArgs {
        id: None,
        last: true,
    })
    .unwrap();

    let next = command.execute(&snapshot).unwrap();
    assert_eq!(next.rows.len(), 2);
    assert!(next.rows.iter().all(|row| row.id != last_id));

    let restored = command.undo(&next).unwrap();
    assert_eq!(restored.rows[2].id, last_id);
    assert_eq!(restored, snapshot);
}

#[test]
fn delete_middle_row_keeps_position_on_undo() {
    let snapshot = Snapshot::with_dimensions(1, 3);
    let middle = snapshot.rows[1].id;
    let mut command = RowDeleteCommand::new(RowDeleteArgs {
        id: Some(middle),
        last: false,
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();
    let restored = command.undo(&next).unwrap();
    assert_eq!(restored.rows[1].id, middle);
    assert_eq!(restored, snapshot);
}

#[test]
fn delete_requires_id_or_last() {
    assert!(RowDeleteCommand::new(RowDeleteArgs::default()).is_err());
}

#[test]
fn added_row_gets_one_default_cell_per_column() {
    let mut snapshot = Snapshot::with_dimensions(1, 1);
    let number = Column::new(CellType::Number, "Amount");
    snapshot.columns.push(number.clone());
    snapshot.rows[0]
        .cells
        .push(loom_core::Cell::new(number.id, CellValue::Number(Some(3.0))));

    let mut command = RowAddCommand::new(RowAddArgs {
        created_at: Some(1_700_000_000_000),
        ..RowAddArgs::default()
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();

    let added = &next.rows[1];
    assert_eq!(Some(added.id), command.row_id());
    assert_eq!(added.creation_time, 1_700_000_000_000);
    assert_eq!(added.last_edited_time, 1_700_000_000_000);
    assert_eq!(added.cells.len(), 2);
    assert_eq!(added.cells[0].value, CellValue::Text(String::new()));
    assert_eq!(added.cells[1].value, CellValue::Number(None));
    assert!(next.check_integrity().is_ok());

    assert_eq!(command.undo(&next).unwrap(), snapshot);
    assert_eq!(command.redo(&snapshot).unwrap(), next);
}

#[test]
fn add_above_and_below_anchor_row() {
    let snapshot = Snapshot::with_dimensions(1, 2);
    let anchor = snapshot.rows[1].id;

    let mut above = RowAddCommand::new(RowAddArgs {
        above: Some(anchor),
        ..RowAddArgs::default()
    })
    .unwrap();
    let next = above.execute(&snapshot).unwrap();
    assert_eq!(Some(next.rows[1].id), above.row_id());
    assert_eq!(next.rows[2].id, anchor);

    let mut below = RowAddCommand::new(RowAddArgs {
        below: Some(anchor),
        ..RowAddArgs::default()
    })
    .unwrap();
    let next = below.execute(&snapshot).unwrap();
    assert_eq!(next.rows[1].id, anchor);
    assert_eq!(Some(next.rows[2].id), below.row_id());
}

#[test]
fn add_with_unknown_source_is_rejected() {
    let snapshot = Snapshot::with_dimensions(1, 0);
    let mut command = RowAddCommand::new(RowAddArgs {
        source_id: Some(Uuid::new_v4()),
        ..RowAddArgs::default()
    })
    .unwrap();
    assert!(matches!(
        command.execute(&snapshot),
        Err(CommandError::NotFound(_))
    ));
}

#[test]
fn add_with_source_attaches_row() {
    let snapshot = Snapshot::with_dimensions(1, 0);
    let mut source = SourceAddCommand::new(SourceAddArgs {
        kind: None,
        content: Some("inbox".to_string()),
    })
    .unwrap();
    let with_source = source.execute(&snapshot).unwrap();

    let mut command = RowAddCommand::new(RowAddArgs {
        source_id: Some(source.source_id()),
        ..RowAddArgs::default()
    })
    .unwrap();
    let next = command.execute(&with_source).unwrap();
    assert_eq!(next.rows[0].source_id, Some(source.source_id()));
    assert!(next.check_integrity().is_ok());
}

#[test]
fn reorder_row_and_undo() {
    let snapshot = Snapshot::with_dimensions(1, 4);
    let moved = snapshot.rows[3].id;
    let mut command = RowReorderCommand::new(RowReorderArgs {
        id: Some(moved),
        to_index: Some(0),
    })
    .unwrap();
    let next = command.execute(&snapshot).unwrap();
    assert_eq!(next.rows[0].id, moved);
    assert_eq!(command.undo(&next).unwrap(), snapshot);
}
