//! ModGuard Store
//!
//! Durable storage for moderation requests, their verdicts, and the
//! notification log.
//!
//! The pipeline talks to storage only through the [`ModerationStore`] trait;
//! [`SqliteStore`] is the bundled implementation with embedded migrations.

pub mod error;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
pub use store::ModerationStore;
