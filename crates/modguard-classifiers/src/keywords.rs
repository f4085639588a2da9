//! Keyword signal vocabularies for the heuristic fallback

use aho_corasick::AhoCorasick;
use modguard_core::{Error, Result};

/// Markers that flag a response as inappropriate
pub const INAPPROPRIATE_SIGNALS: &[&str] = &[
    "inappropriate",
    "nsfw",
    "sexual",
    "porn",
    "hate",
    "violence",
    "illegal",
    "abuse",
];

/// Markers that mark a response as safe
pub const SAFE_SIGNALS: &[&str] = &[
    "appropriate",
    "safe",
    "no issues",
    "no inappropriate",
    "not inappropriate",
    "clean",
];

/// Substring matcher over a fixed vocabulary using Aho-Corasick
pub struct SignalMatcher {
    patterns: AhoCorasick,
    vocabulary: Vec<String>,
}

impl SignalMatcher {
    /// Build a matcher over the given keywords
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary: Vec<String> = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();

        let patterns = AhoCorasick::new(&vocabulary)
            .map_err(|e| Error::config(format!("Failed to build signal matcher: {}", e)))?;

        Ok(Self {
            patterns,
            vocabulary,
        })
    }

    /// Earliest vocabulary entry (by vocabulary order) occurring in
    /// already-lowercased text
    pub fn first_signal(&self, lowered: &str) -> Option<&str> {
        self.patterns
            .find_overlapping_iter(lowered)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|idx| self.vocabulary[idx].as_str())
    }

    /// Number of keywords in the vocabulary
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}
