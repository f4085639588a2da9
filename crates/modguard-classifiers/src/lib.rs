//! ModGuard Classifiers
//!
//! Remote content classification and verdict interpretation.
//!
//! - [`ClassifierClient`]: one call to an external reasoning/vision model,
//!   returning raw text or a typed [`ClassifierError`]
//! - [`ChatCompletionsClient`]: the OpenAI-compatible implementation
//! - [`VerdictParser`]: tolerant parsing of the model's answer, structured
//!   JSON first and keyword heuristics second

pub mod chat;
pub mod classifier;
pub mod keywords;
pub mod prompts;
pub mod verdict;

pub use chat::{ChatClientConfig, ChatCompletionsClient};
pub use classifier::{ClassifierClient, ClassifierError};
pub use keywords::SignalMatcher;
pub use prompts::{ClassificationRequest, SYSTEM_PROMPT};
pub use verdict::{failure_verdict, ParsedVerdict, VerdictParser};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassifierClient, ClassifierError};
    pub use crate::prompts::ClassificationRequest;
    pub use crate::verdict::{ParsedVerdict, VerdictParser};
}
