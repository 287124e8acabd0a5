use std::path::PathBuf;

use super::*;

#[test]
fn plan_with_actions_and_done_parses() {
    let plan = parse_plan(
        r#"{
            "actions": [
                {"click_element": {"index": 3}},
                {"input_text": {"index": 5, "text": "estimate"}},
                {"upload_file": {"selector": "input[type=file]", "path": "/tmp/upload.xlsx"}}
            ],
            "done": false
        }"#,
    )
    .unwrap();

    assert_eq!(plan.actions.len(), 3);
    assert!(!plan.done);
    assert_eq!(plan.actions[0], AgentAction::ClickElement { index: 3 });
    assert_eq!(
        plan.actions[2],
        AgentAction::UploadFile {
            selector: "input[type=file]".to_string(),
            path: PathBuf::from("/tmp/upload.xlsx"),
        }
    );
}

#[test]
fn missing_fields_default_to_an_empty_incomplete_plan() {
    let plan = parse_plan("{}").unwrap();
    assert!(plan.actions.is_empty());
    assert!(!plan.done);

    let plan = parse_plan(r#"{"done": true}"#).unwrap();
    assert!(plan.actions.is_empty());
    assert!(plan.done);
}

#[test]
fn non_json_reply_is_invalid_response() {
    let result = parse_plan("I clicked the import button for you.");
    assert!(matches!(result, Err(AgentError::InvalidResponse(_))));
}

#[test]
fn unknown_action_kind_is_invalid_response() {
    let result = parse_plan(r#"{"actions": [{"scroll_down": {"pixels": 100}}], "done": false}"#);
    assert!(matches!(result, Err(AgentError::InvalidResponse(_))));
}

#[test]
fn upload_outside_the_allow_list_is_rejected() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let allowed = vec![file.path().to_path_buf()];

    let result = validate_upload(&allowed, &PathBuf::from("/etc/passwd"));
    assert!(matches!(result, Err(AgentError::FileNotAllowed(_))));
}

#[test]
fn allow_listed_missing_file_is_rejected() {
    let missing = PathBuf::from("/nonexistent/upload.xlsx");
    let result = validate_upload(std::slice::from_ref(&missing), &missing);
    assert!(matches!(result, Err(AgentError::FileNotAllowed(_))));
}

#[test]
fn allow_listed_existing_file_is_accepted() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().to_path_buf();
    validate_upload(std::slice::from_ref(&path), &path).unwrap();
}
