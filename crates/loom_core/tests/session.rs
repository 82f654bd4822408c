use loom_core::command::{
    CellUpdateArgs, ColumnAddArgs, ColumnSortArgs, ColumnUpdateArgs, FilterAddArgs,
    FilterUpdateArgs, RowAddArgs, SettingsUpdateArgs,
};
use loom_core::model::filter::NumberOperator;
use loom_core::{
    CalculationType, CalculationValue, CellType, CellValue, CommandError, CommandRequest,
    FilterCondition, HistoryConfig, IntegrityError, LoomSession, Row, Snapshot, SortDir,
};

/// Session over a `Name` text column and a `Score` number column with
/// three scored rows.
fn scored_session() -> LoomSession {
    let mut session = LoomSession::open(Snapshot::with_dimensions(1, 0), HistoryConfig::default())
        .unwrap();
    session
        .submit(CommandRequest::ColumnAdd(ColumnAddArgs {
            insert_at: None,
            kind: Some(CellType::Number),
            name: Some("Score".to_string()),
        }))
        .unwrap();

    for (name, score) in [("ada", 7.0), ("bob", 2.0), ("cyd", 5.0)] {
        session
            .submit(CommandRequest::RowAdd(RowAddArgs::default()))
            .unwrap();
        let snapshot = session.snapshot();
        let row_id = snapshot.rows[snapshot.rows.len() - 1].id;
        let name_column = snapshot.columns[0].id;
        let score_column = snapshot.columns[1].id;
        session
            .submit(CommandRequest::CellUpdate(CellUpdateArgs {
                row_id: Some(row_id),
                column_id: Some(name_column),
                value: Some(CellValue::Text(name.to_string())),
                edited_at: None,
            }))
            .unwrap();
        session
            .submit(CommandRequest::CellUpdate(CellUpdateArgs {
                row_id: Some(row_id),
                column_id: Some(score_column),
                value: Some(CellValue::Number(Some(score))),
                edited_at: None,
            }))
            .unwrap();
    }
    session
}

fn names(rows: &[&Row]) -> Vec<String> {
    rows.iter()
        .map(|row| match &row.cells[0].value {
            CellValue::Text(text) => text.clone(),
            other => panic!("unexpected payload {other:?}"),
        })
        .collect()
}

#[test]
fn open_rejects_broken_snapshot() {
    let mut snapshot = Snapshot::with_dimensions(2, 1);
    snapshot.rows[0].cells.pop();
    assert!(LoomSession::open(snapshot, HistoryConfig::default()).is_err());

    let mut no_columns = Snapshot::with_dimensions(1, 0);
    no_columns.columns.clear();
    assert_eq!(
        LoomSession::open(no_columns, HistoryConfig::default()).unwrap_err(),
        IntegrityError::NoColumns
    );
}

#[test]
fn visible_rows_filter_then_search_then_sort() {
    let mut session = scored_session();
    let score_column = session.snapshot().columns[1].id;
    assert_eq!(names(&session.visible_rows("")), vec!["ada", "bob", "cyd"]);

    session
        .submit(CommandRequest::FilterAdd(FilterAddArgs {
            column_id: Some(score_column),
            condition: Some(FilterCondition::Number {
                operator: NumberOperator::GreaterOrEqual,
                value: Some(5.0),
            }),
        }))
        .unwrap();
    session
        .submit(CommandRequest::ColumnSort(ColumnSortArgs {
            id: Some(score_column),
            dir: Some(SortDir::Ascending),
        }))
        .unwrap();
    assert_eq!(names(&session.visible_rows("")), vec!["cyd", "ada"]);
    assert_eq!(names(&session.visible_rows("AD")), vec!["ada"]);

    let filter_id = session.snapshot().filters[0].id;
    session
        .submit(CommandRequest::FilterUpdate(FilterUpdateArgs {
            id: Some(filter_id),
            condition: None,
            is_enabled: Some(false),
        }))
        .unwrap();
    assert_eq!(names(&session.visible_rows("")), vec!["bob", "cyd", "ada"]);
}

#[test]
fn calculations_follow_visible_rows() {
    let mut session = scored_session();
    let score_column = session.snapshot().columns[1].id;
    session
        .submit(CommandRequest::ColumnUpdate(ColumnUpdateArgs {
            id: Some(score_column),
            calculation_type: Some(CalculationType::Sum),
            ..ColumnUpdateArgs::default()
        }))
        .unwrap();

    let all = session.visible_rows("");
    assert_eq!(
        session.calculations(&all),
        vec![(score_column, CalculationValue::Number(14.0))]
    );

    let searched = session.visible_rows("bob");
    assert_eq!(
        session.calculations(&searched),
        vec![(score_column, CalculationValue::Number(2.0))]
    );
}

#[test]
fn undo_redo_walk_the_session_timeline() {
    let mut session = scored_session();
    let before = session.snapshot().clone();

    session
        .submit(CommandRequest::SettingsUpdate(SettingsUpdateArgs {
            num_frozen_columns: Some(10),
            show_calculation_row: None,
        }))
        .unwrap();
    assert_eq!(session.snapshot().settings.num_frozen_columns, 2);

    assert_eq!(session.undo().unwrap(), &before);
    assert!(session.history().can_redo());
    assert_eq!(session.redo().unwrap().settings.num_frozen_columns, 2);
}

#[test]
fn invalid_request_is_rejected_before_touching_history() {
    let mut session = scored_session();
    let depth = session.history().undo_depth();
    let before = session.snapshot().clone();

    let err = session
        .submit(CommandRequest::FilterAdd(FilterAddArgs::default()))
        .unwrap_err();
    assert!(matches!(err, CommandError::Arguments(_)));
    assert_eq!(session.history().undo_depth(), depth);
    assert_eq!(session.into_snapshot(), before);
}
