//! HTTP-level tests for the chat-completions classifier

use modguard_classifiers::{
    ChatClientConfig, ChatCompletionsClient, ClassifierClient, ClassifierError, SYSTEM_PROMPT,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "model": "sonar-pro",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

fn client_for(server: &MockServer, timeout: Duration) -> ChatCompletionsClient {
    ChatCompletionsClient::new(ChatClientConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        model: "sonar-pro".to_string(),
        timeout,
    })
    .expect("client")
}

#[tokio::test]
async fn text_classification_sends_system_prompt_and_zero_temperature() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "sonar-pro",
            "temperature": 0.0,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": "Moderate this text for inappropriate content: hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"classification":"SAFE","reasoning":"greeting","confidence":0.99}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let raw = client
        .classify_text("Moderate this text for inappropriate content: hi")
        .await
        .expect("classification");

    assert!(raw.contains("greeting"));
}

#[tokio::test]
async fn image_classification_sends_content_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": [
                    {"type": "text", "text": "Moderate this image for inappropriate content."},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AA=="}}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("looks clean")))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let raw = client
        .classify_image(
            "data:image/png;base64,AA==",
            "Moderate this image for inappropriate content.",
        )
        .await
        .expect("classification");

    assert_eq!(raw, "looks clean");
}

#[tokio::test]
async fn non_success_status_is_a_typed_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.classify_text("anything").await.unwrap_err();

    match err {
        ClassifierError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(100));
    let err = client.classify_text("anything").await.unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.classify_text("anything").await.unwrap_err();

    assert!(matches!(err, ClassifierError::EmptyResponse));
}

#[tokio::test]
async fn garbage_envelope_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let err = client.classify_text("anything").await.unwrap_err();

    assert!(matches!(err, ClassifierError::Decode(_)));
}
