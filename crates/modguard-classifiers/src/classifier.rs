//! Classifier client trait and transport errors

use async_trait::async_trait;
use std::time::Duration;

/// A remote model that answers moderation prompts with raw text.
///
/// Implementations make exactly one call per method invocation and surface
/// every transport or status failure as a [`ClassifierError`]. Deciding what
/// a failure means for the verdict is the caller's job.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Classify a text prompt
    async fn classify_text(&self, prompt: &str) -> Result<String, ClassifierError>;

    /// Classify an image, given as a `data:` URI, alongside a text prompt
    async fn classify_image(&self, data_uri: &str, prompt: &str) -> Result<String, ClassifierError>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Failure of a single classifier call
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    /// No response within the configured timeout
    #[error("classifier request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or protocol failure
    #[error("classifier transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose envelope could not be decoded
    #[error("classifier response could not be decoded: {0}")]
    Decode(String),

    /// 2xx response without any message content
    #[error("classifier returned no message content")]
    EmptyResponse,
}

impl ClassifierError {
    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether the failure came from the timeout guard
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
