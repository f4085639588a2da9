//! Transactional e-mail channel (Brevo SMTP API)

use crate::channel::{Alert, AlertChannel, ChannelError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default Brevo transactional e-mail endpoint
pub const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

/// Sends the alert as an HTML e-mail
pub struct BrevoEmailChannel {
    endpoint: String,
    api_key: String,
    sender: String,
    /// Fixed recipient; falls back to the submitting user
    recipient: Option<String>,
    http: reqwest::Client,
    timeout: Duration,
}

impl BrevoEmailChannel {
    pub fn new(
        api_key: impl Into<String>,
        sender: impl Into<String>,
        http: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: BREVO_ENDPOINT.to_string(),
            api_key: api_key.into(),
            sender: sender.into(),
            recipient: None,
            http,
            timeout,
        }
    }

    /// Override the provider endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send every alert to a fixed address
    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient;
        self
    }
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    sender: Address<'a>,
    to: Vec<Address<'a>>,
    subject: String,
    #[serde(rename = "htmlContent")]
    html_content: String,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[async_trait]
impl AlertChannel for BrevoEmailChannel {
    async fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        let to = self.recipient.as_deref().unwrap_or(&alert.user_identity);
        let request = EmailRequest {
            sender: Address { email: &self.sender },
            to: vec![Address { email: to }],
            subject: alert.subject(),
            html_content: alert.html_body(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("accept", "application/json")
            .header("api-key", &self.api_key)
            .json(&request)
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

        debug!(fingerprint = %alert.fingerprint, "E-mail alert submitted");
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}
