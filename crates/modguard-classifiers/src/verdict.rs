//! Verdict parsing
//!
//! Turns raw classifier text into a [`Verdict`] through two explicit branches:
//! - Structured: the first balanced `{...}` object in the text, validated
//!   against the verdict schema
//! - Heuristic: ordered keyword vocabularies over the lowercased text, used
//!   only when the structured branch finds no object or rejects it

use crate::keywords::{SignalMatcher, INAPPROPRIATE_SIGNALS, SAFE_SIGNALS};
use modguard_core::{Classification, Result, Verdict, VerdictSource};
use serde::Deserialize;
use tracing::debug;

/// Reasoning used when the structured object omits it
pub const DEFAULT_REASONING: &str = "No reasoning provided";

/// Confidence used when the structured object omits it
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Confidence assigned to a keyword hit
pub const HEURISTIC_CONFIDENCE: f64 = 0.9;

/// Confidence when no keyword matched
pub const UNCLEAR_CONFIDENCE: f64 = 0.5;

/// Reasoning when no keyword matched
pub const UNCLEAR_REASONING: &str = "response unclear, defaulting to safe";

/// Reasoning for a safe keyword hit
pub const SAFE_SIGNAL_REASONING: &str = "Classifier response indicates content is safe";

/// Verdict tagged with the branch that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedVerdict {
    Structured(Verdict),
    Heuristic(Verdict),
}

impl ParsedVerdict {
    pub fn verdict(&self) -> &Verdict {
        match self {
            Self::Structured(v) | Self::Heuristic(v) => v,
        }
    }

    pub fn into_verdict(self) -> Verdict {
        match self {
            Self::Structured(v) | Self::Heuristic(v) => v,
        }
    }

    pub fn source(&self) -> VerdictSource {
        match self {
            Self::Structured(_) => VerdictSource::Structured,
            Self::Heuristic(_) => VerdictSource::Heuristic,
        }
    }
}

/// Wire schema of the embedded verdict object
#[derive(Debug, Deserialize)]
struct StructuredVerdict {
    #[serde(default)]
    classification: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl StructuredVerdict {
    fn validate(self) -> Option<Verdict> {
        let classification = match self.classification {
            Some(label) => Classification::from_label(&label)?,
            None => Classification::Safe,
        };
        Some(Verdict::new(
            classification,
            self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            self.reasoning.unwrap_or_else(|| DEFAULT_REASONING.to_string()),
        ))
    }
}

/// Parser for classifier responses
pub struct VerdictParser {
    inappropriate: SignalMatcher,
    safe: SignalMatcher,
}

impl VerdictParser {
    /// Create a parser with the standard vocabularies
    pub fn new() -> Result<Self> {
        Self::with_vocabularies(INAPPROPRIATE_SIGNALS.iter().copied(), SAFE_SIGNALS.iter().copied())
    }

    /// Create a parser with custom vocabularies
    pub fn with_vocabularies<I, J, S, T>(inappropriate: I, safe: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Ok(Self {
            inappropriate: SignalMatcher::new(inappropriate)?,
            safe: SignalMatcher::new(safe)?,
        })
    }

    /// Parse raw classifier text into a verdict
    pub fn parse(&self, raw: &str) -> ParsedVerdict {
        if let Some(verdict) = parse_structured(raw) {
            return ParsedVerdict::Structured(verdict);
        }
        debug!("No valid verdict object in classifier response, using keyword heuristics");
        ParsedVerdict::Heuristic(self.heuristic(raw))
    }

    /// Keyword fallback; inappropriate signals win over safe ones
    pub fn heuristic(&self, raw: &str) -> Verdict {
        let lowered = raw.to_lowercase();

        if let Some(signal) = self.inappropriate.first_signal(&lowered) {
            return Verdict::new(
                Classification::Inappropriate,
                HEURISTIC_CONFIDENCE,
                format!("Detected marker '{}' in classifier response", signal),
            );
        }

        if self.safe.first_signal(&lowered).is_some() {
            return Verdict::new(Classification::Safe, HEURISTIC_CONFIDENCE, SAFE_SIGNAL_REASONING);
        }

        Verdict::new(Classification::Safe, UNCLEAR_CONFIDENCE, UNCLEAR_REASONING)
    }
}

impl Default for VerdictParser {
    fn default() -> Self {
        Self::new().expect("Failed to build default verdict parser")
    }
}

/// Availability default used when the classifier call itself failed
pub fn failure_verdict(error: &str) -> Verdict {
    Verdict::new(
        Classification::Safe,
        0.0,
        format!("Classifier moderation failed: {}", error),
    )
}

/// Strict structured branch: first balanced object, schema-validated
pub fn parse_structured(raw: &str) -> Option<Verdict> {
    let object = extract_first_object(raw)?;
    let parsed: StructuredVerdict = serde_json::from_str(object).ok()?;
    parsed.validate()
}

/// First balanced `{...}` substring of `text`.
///
/// One pass from the first opening brace. Braces inside JSON string
/// literals do not count toward nesting. When the outermost brace never
/// closes, the earliest-opening object that did close is returned, so a
/// stray `{` in prose does not hide a later object. Returns `None` when no
/// opening brace is ever closed.
pub fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut open: Vec<usize> = Vec::new();
    let mut earliest: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                let Some(opened) = open.pop() else {
                    continue;
                };
                if open.is_empty() {
                    return Some(&text[opened..=i]);
                }
                if earliest.map_or(true, |(s, _)| opened < s) {
                    earliest = Some((opened, i));
                }
            }
            _ => {}
        }
    }

    earliest.map(|(s, e)| &text[s..=e])
}
