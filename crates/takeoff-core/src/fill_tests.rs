use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use super::*;

/// Fake fill target backed by a static (label -> fields) map.
#[derive(Default)]
struct FakeTarget {
    /// Fields returned for labels containing the key as a substring.
    rows: HashMap<String, Vec<(FieldRef, bool)>>,
    /// (field, value) pairs in write order.
    writes: Mutex<Vec<(FieldRef, String)>>,
    /// Fields that error on write.
    failing: Vec<FieldRef>,
}

impl FakeTarget {
    fn with_row(mut self, label: &str, fields: Vec<(FieldRef, bool)>) -> Self {
        self.rows.insert(label.to_string(), fields);
        self
    }

    fn writes(&self) -> Vec<(FieldRef, String)> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl FillTarget for FakeTarget {
    async fn candidate_fields(&self, item_label: &str) -> Result<Vec<FieldRef>, CoreError> {
        let mut out = Vec::new();
        for (label, fields) in &self.rows {
            if label.contains(item_label) {
                out.extend(fields.iter().map(|(f, _)| *f));
            }
        }
        Ok(out)
    }

    async fn is_visible(&self, field: &FieldRef) -> Result<bool, CoreError> {
        Ok(self
            .rows
            .values()
            .flatten()
            .find(|(f, _)| f == field)
            .map(|(_, visible)| *visible)
            .unwrap_or(false))
    }

    async fn write_and_commit(&self, field: &FieldRef, value: &str) -> Result<(), CoreError> {
        if self.failing.contains(field) {
            return Err(CoreError::Target("input detached".to_string()));
        }
        self.writes.lock().push((*field, value.to_string()));
        Ok(())
    }
}

fn instruction(label: &str, value: &str) -> FillInstruction {
    FillInstruction {
        service_item_type: label.to_string(),
        value: value.to_string(),
    }
}

fn filler() -> FieldFiller {
    FieldFiller::new(Duration::ZERO)
}

#[tokio::test]
async fn writes_value_to_first_visible_field() {
    let target = FakeTarget::default().with_row(
        "Mowing - Weekly",
        vec![(FieldRef(1), false), (FieldRef(2), true), (FieldRef(3), true)],
    );

    let report = filler().fill(&[instruction("Mowing", "42")], &target).await;

    assert_eq!(target.writes(), vec![(FieldRef(2), "42".to_string())]);
    assert_eq!(report.filled, vec!["Mowing".to_string()]);
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn unmatched_instruction_is_skipped_without_mutation() {
    let target = FakeTarget::default().with_row("Mowing", vec![(FieldRef(1), true)]);

    let report = filler().fill(&[instruction("Z", "7")], &target).await;

    assert!(target.writes().is_empty());
    assert_eq!(report.skipped, vec!["Z".to_string()]);
    assert!(report.filled.is_empty());
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn all_fields_invisible_is_skipped() {
    let target = FakeTarget::default()
        .with_row("Edging", vec![(FieldRef(1), false), (FieldRef(2), false)]);

    let report = filler().fill(&[instruction("Edging", "9")], &target).await;

    assert!(target.writes().is_empty());
    assert_eq!(report.skipped, vec!["Edging".to_string()]);
}

#[tokio::test]
async fn instructions_run_in_input_order() {
    let target = FakeTarget::default()
        .with_row("Mowing", vec![(FieldRef(1), true)])
        .with_row("Edging", vec![(FieldRef(2), true)]);

    let instructions = vec![
        instruction("Edging", "1"),
        instruction("Mowing", "2"),
        instruction("Edging", "3"),
    ];
    let report = filler().fill(&instructions, &target).await;

    assert_eq!(
        target.writes(),
        vec![
            (FieldRef(2), "1".to_string()),
            (FieldRef(1), "2".to_string()),
            (FieldRef(2), "3".to_string()),
        ]
    );
    assert_eq!(report.filled, vec!["Edging", "Mowing", "Edging"]);
}

#[tokio::test]
async fn target_failure_is_counted_and_run_continues() {
    let mut target = FakeTarget::default()
        .with_row("Mowing", vec![(FieldRef(1), true)])
        .with_row("Edging", vec![(FieldRef(2), true)]);
    target.failing = vec![FieldRef(1)];

    let instructions = vec![instruction("Mowing", "1"), instruction("Edging", "2")];
    let report = filler().fill(&instructions, &target).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.filled, vec!["Edging".to_string()]);
    assert_eq!(target.writes(), vec![(FieldRef(2), "2".to_string())]);
}

#[test]
fn commit_key_parses_both_variants() {
    assert_eq!("Tab".parse::<CommitKey>().unwrap(), CommitKey::Tab);
    assert_eq!("enter".parse::<CommitKey>().unwrap(), CommitKey::Enter);
    assert!("Escape".parse::<CommitKey>().is_err());
    assert_eq!(CommitKey::Tab.key_name(), "Tab");
}
