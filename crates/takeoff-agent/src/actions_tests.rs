use super::*;

#[test]
fn actions_serialize_as_externally_tagged_dicts() {
    let action = InitialAction::GoToUrl {
        url: "https://cloud.example.com/login".to_string(),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"go_to_url": {"url": "https://cloud.example.com/login"}})
    );

    let action = InitialAction::InputText {
        index: 2,
        text: "secret".to_string(),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"input_text": {"index": 2, "text": "secret"}})
    );
}

#[test]
fn actions_round_trip_through_serde() {
    let actions = vec![
        InitialAction::GoToUrl {
            url: "https://cloud.example.com".to_string(),
        },
        InitialAction::Wait { seconds: 10 },
        InitialAction::InputText {
            index: 1,
            text: "bot@example.com".to_string(),
        },
        InitialAction::ClickElement { index: 6 },
    ];
    let json = serde_json::to_string(&actions).unwrap();
    let parsed: Vec<InitialAction> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, actions);
}

#[test]
fn upstream_style_action_list_parses() {
    let json = r#"[
        {"go_to_url": {"url": "https://cloud.example.com/login"}},
        {"wait": {"seconds": 10}},
        {"input_text": {"index": 1, "text": "bot@example.com"}},
        {"click_element": {"index": 6}}
    ]"#;
    let actions: Vec<InitialAction> = serde_json::from_str(json).unwrap();
    assert_eq!(actions.len(), 4);
    assert_eq!(actions[3], InitialAction::ClickElement { index: 6 });
}
