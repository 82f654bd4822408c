use loom_core::model::filter::NumberOperator;
use loom_core::{
    CalculationValue, CellType, CellValue, CommandRequest, FilterCondition, LoomSession,
    Snapshot,
};
use serde_json::json;

#[test]
fn command_request_parses_tagged_records() {
    let request: CommandRequest =
        serde_json::from_value(json!({"command": "column_delete", "args": {"last": true}}))
            .unwrap();
    match request {
        CommandRequest::ColumnDelete(args) => {
            assert!(args.last);
            assert!(args.id.is_none());
        }
        other => panic!("unexpected request {other:?}"),
    }

    let request: CommandRequest = serde_json::from_value(json!({
        "command": "column_add",
        "args": {"type": "multi_tag", "name": "Labels"}
    }))
    .unwrap();
    match request {
        CommandRequest::ColumnAdd(args) => {
            assert_eq!(args.kind, Some(CellType::MultiTag));
            assert_eq!(args.name.as_deref(), Some("Labels"));
            assert_eq!(args.insert_at, None);
        }
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn unknown_command_name_fails_to_parse() {
    let parsed = serde_json::from_value::<CommandRequest>(json!({
        "command": "column_explode",
        "args": {}
    }));
    assert!(parsed.is_err());
}

#[test]
fn submitted_json_drives_a_session() {
    let mut session = LoomSession::new();
    let requests = [
        json!({"command": "column_add", "args": {"type": "number", "name": "Score"}}),
        json!({"command": "row_add", "args": {"created_at": 5}}),
        json!({"command": "settings_update", "args": {"show_calculation_row": false}}),
    ];
    for request in requests {
        let request: CommandRequest = serde_json::from_value(request).unwrap();
        session.submit(request).unwrap();
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.columns.len(), 2);
    assert_eq!(snapshot.rows.len(), 2);
    assert_eq!(snapshot.rows[1].creation_time, 5);
    assert!(!snapshot.settings.show_calculation_row);
    assert_eq!(session.history().undo_depth(), 3);
}

#[test]
fn cell_values_serialize_as_tagged_objects() {
    assert_eq!(
        serde_json::to_value(CellValue::Number(Some(3.5))).unwrap(),
        json!({"type": "number", "value": 3.5})
    );
    assert_eq!(
        serde_json::to_value(CellValue::Checkbox(true)).unwrap(),
        json!({"type": "checkbox", "value": true})
    );
    assert_eq!(
        serde_json::to_value(CellValue::CreationTime).unwrap(),
        json!({"type": "creation_time"})
    );
    assert_eq!(
        serde_json::to_value(CalculationValue::Count(4)).unwrap(),
        json!({"type": "count", "value": 4})
    );
}

#[test]
fn filter_condition_carries_its_family_tag() {
    let condition = FilterCondition::Number {
        operator: NumberOperator::GreaterOrEqual,
        value: Some(2.0),
    };
    let encoded = serde_json::to_value(&condition).unwrap();
    assert_eq!(
        encoded,
        json!({"type": "number", "operator": "greater_or_equal", "value": 2.0})
    );
    let decoded: FilterCondition = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, condition);
}

#[test]
fn snapshot_survives_json_and_keeps_column_type_key() {
    let mut snapshot = Snapshot::with_dimensions(2, 2);
    snapshot.rows[0].cells[1].value = CellValue::Text("hello".to_string());

    let encoded = serde_json::to_string(&snapshot).unwrap();
    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["columns"][0]["type"], json!("text"));

    let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, snapshot);
    assert!(decoded.check_integrity().is_ok());
}
