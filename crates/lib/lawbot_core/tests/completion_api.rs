//! Completion client against a mock OpenAI-compatible server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lawbot_core::completion::{
    CompletionClient, CompletionError, CompletionSettings, DEFAULT_SYSTEM_PROMPT,
    UPSTREAM_FAILURE_MESSAGE,
};

fn client_for(server: &MockServer, api_key: &str) -> CompletionClient {
    CompletionClient::new(CompletionSettings {
        api_key: Some(api_key.to_string()),
        base_url: Some(server.uri()),
        ..Default::default()
    })
    .expect("client")
}

fn reply_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn sends_system_prompt_and_latest_message_only() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 500,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": DEFAULT_SYSTEM_PROMPT },
                { "role": "user", "content": "What is a contract?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
            "A contract is an enforceable agreement. This is not legal advice.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server, "sk-test")
        .complete("What is a contract?")
        .await
        .expect("reply");

    assert_eq!(
        reply,
        "A contract is an enforceable agreement. This is not legal advice."
    );
}

#[tokio::test]
async fn openrouter_key_uses_openrouter_model_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-or-v1-test"))
        .and(header("x-title", "LawBot"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("hi")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server, "sk-or-v1-test")
        .complete("hello")
        .await
        .expect("reply");
    assert_eq!(reply, "hi");
}

#[tokio::test]
async fn model_override_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-4o" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(CompletionSettings {
        api_key: Some("sk-test".into()),
        base_url: Some(server.uri()),
        model: Some("gpt-4o".into()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(client.complete("hello").await.unwrap(), "ok");
}

#[tokio::test]
async fn unauthorized_is_classified_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, "sk-bad")
        .complete("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, CompletionError::Unauthorized(ref body) if body == "invalid api key"));
    assert_eq!(err.kind(), "auth_error");
    assert_eq!(err.user_message(), UPSTREAM_FAILURE_MESSAGE);
}

#[tokio::test]
async fn rate_limit_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, "sk-test")
        .complete("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::RateLimited(_)));
    assert_eq!(err.user_message(), UPSTREAM_FAILURE_MESSAGE);
}

#[tokio::test]
async fn server_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server, "sk-test")
        .complete("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Status { status: 503, .. }));
}

#[tokio::test]
async fn missing_choices_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server, "sk-test")
        .complete("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::MalformedResponse(_)));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, "sk-test")
        .complete("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::MalformedResponse(_)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply_body("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = CompletionClient::new(CompletionSettings {
        api_key: Some("sk-test".into()),
        base_url: Some(server.uri()),
        timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .unwrap();

    let err = client.complete("hello").await.unwrap_err();
    assert!(matches!(err, CompletionError::Timeout), "{err:?}");
    assert_eq!(err.user_message(), UPSTREAM_FAILURE_MESSAGE);
}

#[tokio::test]
async fn unreachable_upstream_is_network_error() {
    // Nothing listens on a port once its listener is dropped.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = CompletionClient::new(CompletionSettings {
        api_key: Some("sk-test".into()),
        base_url: Some(format!("http://{addr}")),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap();

    let err = client.complete("hello").await.unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)), "{err:?}");
    assert_eq!(err.kind(), "network_error");
    assert_eq!(err.user_message(), UPSTREAM_FAILURE_MESSAGE);
}
