use ctl::{ChangeLog, ChangeLogEntry};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_log() -> ChangeLog {
    let mut log = ChangeLog::new();
    log.log_change_at(
        "2024-03-01T10:00:00.000000",
        "$DATA",
        vec![lines(&["$DATA a.csv\n"])],
        lines(&["$DATA b.csv\n"]),
    );
    log.log_change_at(
        "2024-03-01T10:05:00.000000",
        "$THETA",
        vec![lines(&["$THETA 1\n"]), lines(&["$THETA 2\n"])],
        lines(&["$THETA 1\n", "$THETA 3\n"]),
    );
    log
}

#[test]
fn log_change_appends_with_timestamp() {
    let mut log = ChangeLog::new();
    log.log_change("$PK", vec![lines(&["$PK\n"])], lines(&["$PK\n", "CL=1\n"]));
    assert_eq!(log.len(), 1);

    let entry = &log.entries()[0];
    assert_eq!(entry.block_name, "$PK");
    assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
}

#[test]
fn json_preserves_order_and_fields() {
    let log = sample_log();
    let json = log.to_json(4).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["block_name"], "$DATA");
    assert_eq!(records[1]["block_name"], "$THETA");
    assert_eq!(records[1]["original_content"][1][0], "$THETA 2\n");
    assert_eq!(records[1]["updated_content"][1], "$THETA 3\n");
    assert_eq!(records[0]["timestamp"], "2024-03-01T10:00:00.000000");

    assert_eq!(ChangeLog::from_json(&json).unwrap(), log);
}

#[test]
fn json_uses_requested_indent() {
    let json = sample_log().to_json(4).unwrap();
    assert!(json.starts_with("[\n    {\n        \"timestamp\""));

    let json = sample_log().to_json(2).unwrap();
    assert!(json.starts_with("[\n  {\n    \"timestamp\""));
}

#[test]
fn empty_log_serializes_to_empty_array() {
    let log = ChangeLog::new();
    assert_eq!(log.to_json(4).unwrap(), "[]");
    assert!(ChangeLog::from_json("[]").unwrap().is_empty());
}

#[test]
fn accepts_misspelt_original_key() {
    let json = r#"[{
        "timestamp": "2024-01-01T00:00:00",
        "block_name": "$DATA",
        "orginal_content": [["$DATA a.csv\n"]],
        "updated_content": ["$DATA b.csv\n"]
    }]"#;
    let log = ChangeLog::from_json(json).unwrap();
    let entry: &ChangeLogEntry = log.iter().next().unwrap();
    assert_eq!(entry.original_content, vec![lines(&["$DATA a.csv\n"])]);
}

#[test]
fn iterates_by_reference() {
    let log = sample_log();
    let names: Vec<&str> = (&log).into_iter().map(|e| e.block_name.as_str()).collect();
    assert_eq!(names, ["$DATA", "$THETA"]);
}
