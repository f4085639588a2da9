//! ModGuard Core
//!
//! Core types and utilities shared across ModGuard components.
//!
//! This crate provides:
//! - The moderation data model (requests, results, notification logs)
//! - Binary verdict types and their canonical string forms
//! - Deterministic content fingerprinting
//! - Error types and result handling

pub mod error;
pub mod fingerprint;
pub mod types;

pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use types::{
    Classification, ContentKind, ModerationRequest, ModerationResult, NotificationLog,
    RequestStatus, UserSummary, Verdict, VerdictSource,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Classification, ContentKind, ModerationRequest, ModerationResult, NotificationLog,
        RequestStatus, Verdict, VerdictSource,
    };
}
