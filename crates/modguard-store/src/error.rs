//! Storage errors

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence failure. Never recovered locally by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No request with this id
    #[error("moderation request not found: {0}")]
    NotFound(String),

    /// Attempt to complete a request that has no result yet
    #[error("moderation request {0} has no result")]
    MissingResult(String),

    /// A stored value could not be mapped back to a domain type
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<modguard_core::Error> for StoreError {
    fn from(err: modguard_core::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}
