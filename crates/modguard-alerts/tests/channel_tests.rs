//! HTTP-level tests for the alert channels

use modguard_alerts::{
    Alert, AlertChannel, AlertDispatcher, AlertsConfig, BrevoEmailChannel, ChannelError,
    ChannelStatus, SlackWebhookChannel,
};
use modguard_core::ContentKind;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> Alert {
    Alert::new(
        "owner@example.com",
        ContentKind::Text,
        "deadbeef",
        "threatening language",
    )
}

#[tokio::test]
async fn slack_posts_text_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({
            "text": alert().message()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let channel = SlackWebhookChannel::new(
        format!("{}/hook", server.uri()),
        reqwest::Client::new(),
        Duration::from_secs(5),
    );

    channel.send(&alert()).await.expect("slack send");
}

#[tokio::test]
async fn slack_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let channel = SlackWebhookChannel::new(
        format!("{}/hook", server.uri()),
        reqwest::Client::new(),
        Duration::from_secs(5),
    );

    let err = channel.send(&alert()).await.unwrap_err();
    assert!(matches!(err, ChannelError::Status { status: 403, .. }));
}

#[tokio::test]
async fn email_sends_to_submitting_user_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .and(header("api-key", "brevo-key"))
        .and(header("accept", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "sender": {"email": "alerts@example.com"},
            "to": [{"email": "owner@example.com"}],
            "subject": "Inappropriate content detected (text)"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"messageId": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let channel = BrevoEmailChannel::new(
        "brevo-key",
        "alerts@example.com",
        reqwest::Client::new(),
        Duration::from_secs(5),
    )
    .with_endpoint(format!("{}/v3/smtp/email", server.uri()));

    channel.send(&alert()).await.expect("email send");
}

#[tokio::test]
async fn email_uses_fixed_recipient_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .and(body_partial_json(serde_json::json!({
            "to": [{"email": "trust-and-safety@example.com"}]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let channel = BrevoEmailChannel::new(
        "brevo-key",
        "alerts@example.com",
        reqwest::Client::new(),
        Duration::from_secs(5),
    )
    .with_endpoint(format!("{}/v3/smtp/email", server.uri()))
    .with_recipient(Some("trust-and-safety@example.com".to_string()));

    channel.send(&alert()).await.expect("email send");
}

#[tokio::test]
async fn dispatcher_from_config_reaches_both_providers_despite_slack_outage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let config = AlertsConfig {
        slack_webhook_url: Some(format!("{}/hook", server.uri())),
        brevo_api_key: Some("brevo-key".to_string()),
        brevo_sender: Some("alerts@example.com".to_string()),
        email_endpoint: format!("{}/v3/smtp/email", server.uri()),
        ..Default::default()
    };
    let dispatcher = AlertDispatcher::from_config(&config, reqwest::Client::new());

    let outcome = dispatcher.dispatch(alert()).await;

    assert_eq!(outcome.label(), "email and slack");
    assert_eq!(outcome.status(), "success");
    assert_eq!(outcome.reports[0].status, ChannelStatus::Delivered);
    assert!(matches!(outcome.reports[1].status, ChannelStatus::Failed(_)));
}
