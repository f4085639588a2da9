//! Persistence gateway trait

use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modguard_core::{ModerationRequest, ModerationResult, NotificationLog, UserSummary};

/// Durable store for requests, results and notification logs.
///
/// Every method commits on its own; callers sequence the stages.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    /// Persist a new request
    async fn insert_request(&self, request: &ModerationRequest) -> StoreResult<()>;

    async fn get_request(&self, id: &str) -> StoreResult<Option<ModerationRequest>>;

    /// Persist a result. Returns `false` if the request already had one, in
    /// which case the stored result is left untouched.
    async fn insert_result(&self, result: &ModerationResult) -> StoreResult<bool>;

    async fn get_result(&self, request_id: &str) -> StoreResult<Option<ModerationResult>>;

    /// Transition a request to `completed`. Fails with
    /// [`StoreError::MissingResult`](crate::StoreError::MissingResult) if no
    /// result exists yet.
    async fn mark_completed(&self, request_id: &str) -> StoreResult<()>;

    /// Persist a notification log row and return its id
    async fn insert_notification(&self, log: &NotificationLog) -> StoreResult<i64>;

    async fn notifications_for(&self, request_id: &str) -> StoreResult<Vec<NotificationLog>>;

    /// Ids of requests still pending that were created before `cutoff`,
    /// oldest first
    async fn pending_before(&self, cutoff: DateTime<Utc>, limit: u32) -> StoreResult<Vec<String>>;

    /// Delete a request together with its result and logs. Returns whether
    /// the request existed.
    async fn delete_request(&self, id: &str) -> StoreResult<bool>;

    /// Per-user request and verdict counts
    async fn user_summary(&self, user_id: &str) -> StoreResult<UserSummary>;
}
