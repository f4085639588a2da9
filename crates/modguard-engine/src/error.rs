//! Orchestrator errors

use modguard_store::StoreError;

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failure of an orchestrator operation.
///
/// Classifier and alert failures never appear here; they are folded into the
/// verdict and the notification outcome respectively.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Submission rejected before anything was persisted
    #[error("invalid submission: {0}")]
    InvalidSubmission(#[from] modguard_core::Error),

    /// Persistence failure; the request stays pending
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No request with this id
    #[error("moderation request not found: {0}")]
    NotFound(String),
}

impl EngineError {
    /// Whether the caller supplied bad input
    pub fn is_invalid_submission(&self) -> bool {
        matches!(self, Self::InvalidSubmission(_))
    }
}
