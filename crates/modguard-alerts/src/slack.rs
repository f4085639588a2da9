//! Chat webhook channel (Slack-compatible incoming webhooks)

use crate::channel::{Alert, AlertChannel, ChannelError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Posts `{"text": message}` to an incoming-webhook URL
pub struct SlackWebhookChannel {
    webhook_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl SlackWebhookChannel {
    pub fn new(webhook_url: impl Into<String>, http: reqwest::Client, timeout: Duration) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            http,
            timeout,
        }
    }
}

#[async_trait]
impl AlertChannel for SlackWebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        let payload = serde_json::json!({ "text": alert.message() });

        let response = self
            .http
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::from_reqwest(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status {
                channel: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        debug!(fingerprint = %alert.fingerprint, "Slack alert submitted");
        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }
}
