use super::*;

#[test]
fn request_serializes_without_empty_fields() {
    let request = CdpRequest {
        id: 7,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&request).unwrap();
    assert_eq!(json, r#"{"id":7,"method":"Page.enable"}"#);
}

#[test]
fn request_serializes_session_id_camel_case() {
    let request = CdpRequest {
        id: 1,
        method: "DOM.getDocument".to_string(),
        params: Some(serde_json::json!({"depth": 0})),
        session_id: Some("SESSION".to_string()),
    };
    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains(r#""sessionId":"SESSION""#));
}

#[test]
fn browser_version_parses_pascal_case_fields() {
    let json = r#"{
        "Browser": "Chrome/135.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "V8-Version": "13.5",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/135.0.0.0");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn event_response_has_method_but_no_id() {
    let json = r#"{"method":"Network.requestWillBeSent","params":{},"sessionId":"S"}"#;
    let response: CdpResponse = serde_json::from_str(json).unwrap();
    assert!(response.id.is_none());
    assert_eq!(response.method.as_deref(), Some("Network.requestWillBeSent"));
}

#[test]
fn request_will_be_sent_params_parse() {
    let json = r#"{
        "requestId": "1000.2",
        "request": {
            "url": "https://cloud.example.com/api/takeoff",
            "method": "POST",
            "headers": {"Content-Type": "application/json"},
            "postData": "{\"value\":42}"
        }
    }"#;
    let params: RequestWillBeSentParams = serde_json::from_str(json).unwrap();
    assert_eq!(params.request.method, "POST");
    assert_eq!(params.request.post_data.as_deref(), Some("{\"value\":42}"));
    let headers = headers_map(&params.request.headers);
    assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
}

#[test]
fn response_received_params_parse() {
    let json = r#"{
        "requestId": "1000.2",
        "response": {
            "url": "https://cloud.example.com/api/takeoff",
            "status": 200,
            "headers": {"content-type": "application/json; charset=utf-8"},
            "mimeType": "application/json"
        }
    }"#;
    let params: ResponseReceivedParams = serde_json::from_str(json).unwrap();
    assert_eq!(params.response.status, 200);
    assert_eq!(params.response.mime_type, "application/json");
}

#[test]
fn headers_map_ignores_non_string_values() {
    let headers = serde_json::json!({"a": "1", "b": 2});
    let map = headers_map(&headers);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("a").map(String::as_str), Some("1"));
}
