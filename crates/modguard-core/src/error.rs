//! Error types for ModGuard

/// Result type alias using ModGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ModGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value did not match the expected domain vocabulary
    #[error("invalid {field}: {value:?}")]
    InvalidValue {
        /// Name of the field being parsed
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// Submitted content was rejected before it reached the pipeline
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new invalid-value error
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }

    /// Create a new invalid-content error
    pub fn invalid_content(msg: impl Into<String>) -> Self {
        Self::InvalidContent(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
