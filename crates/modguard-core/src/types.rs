//! Core types for ModGuard

use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of content submitted for moderation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(Error::invalid_value("content kind", other)),
        }
    }
}

/// Binary moderation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Safe,
    Inappropriate,
}

impl Classification {
    /// Canonical upper-case label, as stored and returned to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Inappropriate => "INAPPROPRIATE",
        }
    }

    /// Parse a label case-insensitively, ignoring surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("safe") {
            Some(Self::Safe)
        } else if label.eq_ignore_ascii_case("inappropriate") {
            Some(Self::Inappropriate)
        } else {
            None
        }
    }

    /// Whether this verdict triggers alert dispatch
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::Inappropriate)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| Error::invalid_value("classification", s))
    }
}

/// Lifecycle state of a moderation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(Error::invalid_value("request status", other)),
        }
    }
}

/// Which branch produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictSource {
    /// Parsed from the JSON object embedded in the classifier response
    Structured,
    /// Derived from keyword heuristics over an unstructured response
    Heuristic,
    /// The classifier call failed; the verdict is the availability default
    Failure,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Heuristic => "heuristic",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for VerdictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerdictSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "structured" => Ok(Self::Structured),
            "heuristic" => Ok(Self::Heuristic),
            "failure" => Ok(Self::Failure),
            other => Err(Error::invalid_value("verdict source", other)),
        }
    }
}

/// The (classification, confidence, reasoning) tuple for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub classification: Classification,

    /// Confidence score; nominally 0.0-1.0
    pub confidence: f64,

    /// Short human-readable explanation
    pub reasoning: String,
}

impl Verdict {
    /// Create a new verdict
    pub fn new(classification: Classification, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self {
            classification,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    /// Whether this verdict triggers alert dispatch
    pub fn is_flagged(&self) -> bool {
        self.classification.is_flagged()
    }

    /// Copy of this verdict with confidence forced into [0.0, 1.0].
    ///
    /// Non-finite values collapse to 0.0.
    pub fn clamped(&self) -> Self {
        let confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            confidence,
            ..self.clone()
        }
    }
}

/// A submission awaiting or having received a verdict
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationRequest {
    /// Opaque identifier (UUID v4)
    pub id: String,

    /// Identity of the submitting user (e-mail address)
    pub user_id: String,

    pub kind: ContentKind,

    /// Declared media type, e.g. `text/plain` or `image/png`
    pub media_type: String,

    /// Raw submitted bytes, kept so processing can be retried
    pub content: Vec<u8>,

    /// Hex SHA-256 of `content`
    pub fingerprint: String,

    pub status: RequestStatus,

    pub created_at: DateTime<Utc>,
}

impl ModerationRequest {
    /// Build a new pending request, computing its fingerprint
    pub fn new(
        user_id: impl Into<String>,
        kind: ContentKind,
        media_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            kind,
            media_type: media_type.into(),
            fingerprint: fingerprint(&content),
            content,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Build a text request
    pub fn text(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(user_id, ContentKind::Text, "text/plain", text.into().into_bytes())
    }

    /// Build an image request
    pub fn image(user_id: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(user_id, ContentKind::Image, media_type, bytes)
    }

    /// Content as text, replacing invalid UTF-8 sequences
    pub fn text_content(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// The persisted verdict for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationResult {
    pub request_id: String,
    pub verdict: Verdict,
    pub source: VerdictSource,

    /// Classifier output exactly as received, or the error text on failure
    pub raw_response: String,
}

impl ModerationResult {
    pub fn new(
        request_id: impl Into<String>,
        verdict: Verdict,
        source: VerdictSource,
        raw_response: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            verdict,
            source,
            raw_response: raw_response.into(),
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.verdict.is_flagged()
    }
}

/// One alert-dispatch attempt
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationLog {
    /// Store-assigned row id; `None` before insertion
    pub id: Option<i64>,
    pub request_id: String,

    /// Channel label; may name several channels at once
    pub channel: String,

    /// Aggregate outcome status
    pub status: String,

    pub sent_at: DateTime<Utc>,
}

impl NotificationLog {
    pub fn new(request_id: impl Into<String>, channel: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: None,
            request_id: request_id.into(),
            channel: channel.into(),
            status: status.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Per-user moderation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub total_requests: u64,
    pub total_results: u64,
    pub safe_count: u64,
    pub inappropriate_count: u64,
}
