use super::*;

fn parent(label: &str) -> TableRow {
    TableRow {
        label: label.to_string(),
        secondary_text: String::new(),
        indent: Some(0),
    }
}

fn child(label: &str, measurement: &str) -> TableRow {
    TableRow {
        label: label.to_string(),
        secondary_text: measurement.to_string(),
        indent: Some(15),
    }
}

fn unlevelled(label: &str) -> TableRow {
    TableRow {
        label: label.to_string(),
        secondary_text: String::new(),
        indent: None,
    }
}

fn pairs(records: &[ServiceItemRecord]) -> Vec<(String, String)> {
    records
        .iter()
        .map(|r| (r.service_type.clone(), r.service_item_type.clone()))
        .collect()
}

#[test]
fn children_attach_to_most_recent_parent() {
    let rows = vec![
        parent("A"),
        child("a1", "SQFT"),
        child("a2", "LF"),
        parent("B"),
        child("b1", "EA"),
    ];
    let records = extract_service_items(&rows);
    assert_eq!(
        pairs(&records),
        vec![
            ("A".into(), "a1".into()),
            ("A".into(), "a2".into()),
            ("B".into(), "b1".into()),
        ]
    );
    assert_eq!(records[0].measurement, "SQFT");
    assert_eq!(records[2].measurement, "EA");
}

#[test]
fn orphan_child_before_any_parent_is_dropped() {
    let rows = vec![child("x1", "SQFT"), parent("A"), child("a1", "LF")];
    let records = extract_service_items(&rows);
    assert_eq!(pairs(&records), vec![("A".into(), "a1".into())]);
}

#[test]
fn parent_rows_emit_nothing_themselves() {
    let rows = vec![parent("A"), parent("B")];
    assert!(extract_service_items(&rows).is_empty());
}

#[test]
fn unlevelled_rows_neither_emit_nor_change_parent() {
    let rows = vec![
        parent("A"),
        unlevelled("header"),
        child("a1", "SQFT"),
    ];
    let records = extract_service_items(&rows);
    assert_eq!(pairs(&records), vec![("A".into(), "a1".into())]);
}

#[test]
fn duplicate_labels_are_not_merged() {
    let rows = vec![parent("A"), child("a1", "SQFT"), child("a1", "SQFT")];
    let records = extract_service_items(&rows);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(extract_service_items(&[]).is_empty());
}
