//! Alert channel trait and the alert payload

use async_trait::async_trait;
use modguard_core::ContentKind;

/// Trait for all alert channels
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Submit the alert to the remote provider.
    ///
    /// `Ok` means the provider accepted the submission, not that the
    /// message was delivered.
    async fn send(&self, alert: &Alert) -> Result<(), ChannelError>;

    /// Get the channel name
    fn name(&self) -> &str;
}

/// Failure of a single channel submission
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    #[error("{channel} request timed out")]
    Timeout { channel: String },

    #[error("{channel} transport error: {message}")]
    Transport { channel: String, message: String },

    #[error("{channel} returned HTTP {status}")]
    Status { channel: String, status: u16 },

    #[error("{channel} task panicked")]
    Panicked { channel: String },
}

impl ChannelError {
    /// Map a reqwest failure for the named channel
    pub fn from_reqwest(channel: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                channel: channel.to_string(),
            }
        } else {
            Self::Transport {
                channel: channel.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// A flagged verdict, ready to be formatted for any channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Identity of the submitting user
    pub user_identity: String,
    pub kind: ContentKind,
    pub fingerprint: String,

    /// Raw classifier response or reasoning
    pub model_response: String,
}

impl Alert {
    pub fn new(
        user_identity: impl Into<String>,
        kind: ContentKind,
        fingerprint: impl Into<String>,
        model_response: impl Into<String>,
    ) -> Self {
        Self {
            user_identity: user_identity.into(),
            kind,
            fingerprint: fingerprint.into(),
            model_response: model_response.into(),
        }
    }

    /// Human-readable alert text shared by every channel
    pub fn message(&self) -> String {
        format!(
            "A new {} was flagged as inappropriate. AI Analysis: {} (Fingerprint: {})",
            self.kind, self.model_response, self.fingerprint
        )
    }

    /// E-mail subject line
    pub fn subject(&self) -> String {
        format!("Inappropriate content detected ({})", self.kind)
    }

    /// E-mail HTML body
    pub fn html_body(&self) -> String {
        format!("<p>{}</p>", escape_html(&self.message()))
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
