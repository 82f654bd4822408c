use loom_core::command::{
    CellUpdateArgs, CellUpdateCommand, ColumnAddArgs, ColumnAddCommand, ColumnDeleteArgs,
    ColumnDeleteCommand, ColumnSortArgs, ColumnSortCommand, RowAddArgs, RowAddCommand,
    RowDeleteArgs, RowDeleteCommand,
};
use loom_core::{
    CellType, CellValue, Command, CommandError, CommandHistory, CommandResult, HistoryConfig,
    Snapshot, SortDir, UndoError,
};

/// Command whose undo always fails, to observe how history reacts.
struct StuckCommand;

impl Command for StuckCommand {
    fn name(&self) -> &'static str {
        "stuck"
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let mut next = snapshot.clone();
        next.settings.show_calculation_row = !next.settings.show_calculation_row;
        Ok(next)
    }

    fn undo(&mut self, _snapshot: &Snapshot) -> CommandResult<Snapshot> {
        Err(UndoError::new("stuck").into())
    }
}

fn scripted(snapshot: &Snapshot) -> Vec<Box<dyn Command>> {
    vec![
        Box::new(ColumnAddCommand::new(ColumnAddArgs {
            insert_at: Some(0),
            kind: Some(CellType::Number),
            name: Some("Amount".to_string()),
        })),
        Box::new(
            RowAddCommand::new(RowAddArgs {
                created_at: Some(10),
                ..RowAddArgs::default()
            })
            .unwrap(),
        ),
        Box::new(
            CellUpdateCommand::new(CellUpdateArgs {
                row_id: Some(snapshot.rows[0].id),
                column_id: Some(snapshot.columns[0].id),
                value: Some(CellValue::Text("hello".to_string())),
                edited_at: Some(20),
            })
            .unwrap(),
        ),
        Box::new(
            ColumnSortCommand::new(ColumnSortArgs {
                id: Some(snapshot.columns[1].id),
                dir: Some(SortDir::Descending),
            })
            .unwrap(),
        ),
        Box::new(
            RowDeleteCommand::new(RowDeleteArgs {
                id: None,
                last: true,
            })
            .unwrap(),
        ),
        Box::new(
            ColumnDeleteCommand::new(ColumnDeleteArgs {
                id: None,
                last: true,
            })
            .unwrap(),
        ),
    ]
}

#[test]
fn full_undo_returns_to_start_and_full_redo_returns_to_end() {
    let start = Snapshot::with_dimensions(2, 2);
    let mut history = CommandHistory::default();

    let mut states = vec![start.clone()];
    for command in scripted(&start) {
        let next = history.run(command, states.last().unwrap()).unwrap();
        assert!(next.check_integrity().is_ok());
        states.push(next);
    }
    assert_eq!(history.undo_depth(), 6);

    let mut current = states.last().unwrap().clone();
    for expected in states.iter().rev().skip(1) {
        current = history.undo(&current).unwrap();
        assert_eq!(&current, expected);
    }
    assert_eq!(current, start);
    assert!(!history.can_undo());
    assert_eq!(history.redo_depth(), 6);

    for expected in states.iter().skip(1) {
        current = history.redo(&current).unwrap();
        assert_eq!(&current, expected);
    }
    assert!(!history.can_redo());
}

#[test]
fn failed_undo_keeps_command_applied() {
    let start = Snapshot::with_dimensions(1, 1);
    let mut history = CommandHistory::default();
    let toggled = history.run(Box::new(StuckCommand), &start).unwrap();

    let err = history.undo(&toggled).unwrap_err();
    assert_eq!(err, CommandError::Undo(UndoError::new("stuck")));
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.next_undo_name(), Some("stuck"));
    assert!(!history.can_redo());
}

#[test]
fn failed_run_leaves_history_untouched() {
    let start = Snapshot::with_dimensions(1, 1);
    let mut history = CommandHistory::default();
    let grown = history
        .run(
            Box::new(ColumnAddCommand::new(ColumnAddArgs::default())),
            &start,
        )
        .unwrap();
    let bad = RowDeleteCommand::new(RowDeleteArgs {
        id: Some(uuid::Uuid::new_v4()),
        last: false,
    })
    .unwrap();

    assert!(matches!(
        history.run(Box::new(bad), &grown),
        Err(CommandError::NotFound(_))
    ));
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.next_undo_name(), Some(ColumnAddCommand::NAME));
    assert_eq!(history.undo(&grown).unwrap(), start);
}

#[test]
fn bounded_history_forgets_oldest_commands() {
    let start = Snapshot::with_dimensions(1, 0);
    let mut history = CommandHistory::new(HistoryConfig::bounded(2));

    let mut current = start.clone();
    for created_at in 0..4 {
        let command = RowAddCommand::new(RowAddArgs {
            created_at: Some(created_at),
            ..RowAddArgs::default()
        })
        .unwrap();
        current = history.run(Box::new(command), &current).unwrap();
    }
    assert_eq!(current.rows.len(), 4);
    assert_eq!(history.undo_depth(), 2);

    current = history.undo(&current).unwrap();
    current = history.undo(&current).unwrap();
    assert_eq!(current.rows.len(), 2);
    assert_eq!(history.undo(&current).unwrap(), current);
}
