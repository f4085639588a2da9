//! Moderation prompts and classification request construction

use crate::classifier::{ClassifierClient, ClassifierError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use modguard_core::{ContentKind, ModerationRequest};

/// System prompt sent with every classifier call.
///
/// Pins the answer to a single JSON object so the structured parsing path
/// succeeds whenever the model cooperates.
pub const SYSTEM_PROMPT: &str = "You are a content moderation system. \
Decide whether the submitted content is SAFE or INAPPROPRIATE. \
Content is INAPPROPRIATE if it contains sexual or NSFW material, hate speech, \
violence or threats, harassment, abuse, or illegal activity. \
Respond with exactly one JSON object and nothing else, in the form \
{\"classification\": \"SAFE\" | \"INAPPROPRIATE\", \"reasoning\": \"<one short sentence>\", \"confidence\": <number between 0 and 1>}.";

/// User prompt accompanying an image
pub const IMAGE_PROMPT: &str = "Moderate this image for inappropriate content.";

/// User prompt for a piece of text
pub fn text_prompt(text: &str) -> String {
    format!("Moderate this text for inappropriate content: {}", text)
}

/// Encode image bytes as a base64 `data:` URI
pub fn image_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}

/// One call's worth of input for a [`ClassifierClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationRequest {
    Text { prompt: String },
    Image { prompt: String, data_uri: String },
}

impl ClassificationRequest {
    /// Build the classifier input for a stored moderation request
    pub fn for_request(request: &ModerationRequest) -> Self {
        match request.kind {
            ContentKind::Text => Self::Text {
                prompt: text_prompt(&request.text_content()),
            },
            ContentKind::Image => Self::Image {
                prompt: IMAGE_PROMPT.to_string(),
                data_uri: image_data_uri(&request.media_type, &request.content),
            },
        }
    }

    /// Dispatch to the matching client method
    pub async fn send(&self, client: &dyn ClassifierClient) -> Result<String, ClassifierError> {
        match self {
            Self::Text { prompt } => client.classify_text(prompt).await,
            Self::Image { prompt, data_uri } => client.classify_image(data_uri, prompt).await,
        }
    }
}
