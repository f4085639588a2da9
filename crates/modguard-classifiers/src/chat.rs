//! OpenAI-compatible chat-completions classifier
//!
//! Sends one non-streaming `/chat/completions` request per classification:
//! ```text
//! POST {base_url}/chat/completions
//! {"model": "sonar-pro", "temperature": 0, "messages": [{"role": "system", ...}, {"role": "user", ...}]}
//! ```
//! and returns the first choice's message content verbatim.

use crate::classifier::{ClassifierClient, ClassifierError};
use crate::prompts::SYSTEM_PROMPT;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest error body kept in a [`ClassifierError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for a chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,

    /// Bearer token; requests are sent unauthenticated when absent
    pub api_key: Option<String>,

    /// Model name
    pub model: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.perplexity.ai".to_string(),
            api_key: None,
            model: "sonar-pro".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Classifier backed by a chat-completions API
pub struct ChatCompletionsClient {
    config: ChatClientConfig,
    http: reqwest::Client,
    endpoint: String,
}

impl ChatCompletionsClient {
    /// Create a new client with its own connection pool
    pub fn new(config: ChatClientConfig) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client that reuses an existing `reqwest::Client`
    pub fn with_http_client(config: ChatClientConfig, http: reqwest::Client) -> Self {
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Self {
            config,
            http,
            endpoint,
        }
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, user: MessageContent<'_>) -> Result<String, ClassifierError> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let start = Instant::now();
        let mut builder = self
            .http
            .post(&self.endpoint)
            .timeout(self.config.timeout)
            .json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Classifier request failed");
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ClassifierError::Decode(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ClassifierError::EmptyResponse)?;

        debug!(
            model = %self.config.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Classifier responded"
        );

        Ok(content)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout(self.config.timeout)
        } else {
            ClassifierError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl ClassifierClient for ChatCompletionsClient {
    async fn classify_text(&self, prompt: &str) -> Result<String, ClassifierError> {
        self.complete(MessageContent::Text(prompt)).await
    }

    async fn classify_image(&self, data_uri: &str, prompt: &str) -> Result<String, ClassifierError> {
        self.complete(MessageContent::Parts(vec![
            ContentPart::Text { text: prompt },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: data_uri },
            },
        ]))
        .await
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
