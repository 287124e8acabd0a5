use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content}
        }]
    })
}

#[tokio::test]
async fn complete_sends_model_and_gateway_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("x-portkey-api-key", "pk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body(r#"{"done":true}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AgentClient::new(format!("{}/v1/chat/completions", server.uri()), "gpt-4o")
        .with_extra_headers(std::collections::HashMap::from([(
            "x-portkey-api-key".to_string(),
            "pk-test".to_string(),
        )]));

    let content = client
        .complete(&[ChatMessage::user("hello")])
        .await
        .unwrap();
    assert_eq!(content, r#"{"done":true}"#);
}

#[tokio::test]
async fn non_success_status_is_a_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = AgentClient::new(server.uri(), "gpt-4o");
    let result = client.complete(&[ChatMessage::user("hello")]).await;
    assert!(matches!(
        result,
        Err(AgentError::Remote { status: 429, body }) if body == "rate limited"
    ));
}

#[tokio::test]
async fn missing_content_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
        )
        .mount(&server)
        .await;

    let client = AgentClient::new(server.uri(), "gpt-4o");
    let result = client.complete(&[ChatMessage::user("hello")]).await;
    assert!(matches!(result, Err(AgentError::InvalidResponse(_))));
}

#[test]
fn message_constructors_set_roles() {
    assert_eq!(ChatMessage::system("s").role, "system");
    assert_eq!(ChatMessage::user("u").role, "user");
}
