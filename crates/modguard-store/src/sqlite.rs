//! SQLite-backed moderation store

use crate::error::{StoreError, StoreResult};
use crate::store::ModerationStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modguard_core::{
    Classification, ContentKind, ModerationRequest, ModerationResult, NotificationLog,
    RequestStatus, UserSummary, Verdict, VerdictSource,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

/// Moderation store on a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connect to `database_url` (e.g. `sqlite://modguard.db`), creating the
    /// file if needed, and apply migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite database at {}", database_url);
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database on a single long-lived connection
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {}", ms)))
}

fn request_from_row(r: &SqliteRow) -> StoreResult<ModerationRequest> {
    let kind: String = r.try_get("content_kind")?;
    let status: String = r.try_get("status")?;
    Ok(ModerationRequest {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        kind: ContentKind::from_str(&kind)?,
        media_type: r.try_get("media_type")?,
        content: r.try_get("content")?,
        fingerprint: r.try_get("fingerprint")?,
        status: RequestStatus::from_str(&status)?,
        created_at: from_millis(r.try_get("created_at")?)?,
    })
}

fn result_from_row(r: &SqliteRow) -> StoreResult<ModerationResult> {
    let classification: String = r.try_get("classification")?;
    let source: String = r.try_get("source")?;
    Ok(ModerationResult {
        request_id: r.try_get("request_id")?,
        verdict: Verdict::new(
            Classification::from_str(&classification)?,
            r.try_get("confidence")?,
            r.try_get::<String, _>("reasoning")?,
        ),
        source: VerdictSource::from_str(&source)?,
        raw_response: r.try_get("llm_response")?,
    })
}

fn notification_from_row(r: &SqliteRow) -> StoreResult<NotificationLog> {
    Ok(NotificationLog {
        id: Some(r.try_get("id")?),
        request_id: r.try_get("request_id")?,
        channel: r.try_get("channel")?,
        status: r.try_get("status")?,
        sent_at: from_millis(r.try_get("sent_at")?)?,
    })
}

#[async_trait]
impl ModerationStore for SqliteStore {
    async fn insert_request(&self, request: &ModerationRequest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO moderation_requests (
                id, user_id, content_kind, media_type,
                content, fingerprint, status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.user_id)
        .bind(request.kind.as_str())
        .bind(&request.media_type)
        .bind(&request.content)
        .bind(&request.fingerprint)
        .bind(request.status.as_str())
        .bind(to_millis(request.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_request(&self, id: &str) -> StoreResult<Option<ModerationRequest>> {
        let row = sqlx::query(
            r#"
            SELECT
                id, user_id, content_kind, media_type,
                content, fingerprint, status, created_at
            FROM moderation_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    async fn insert_result(&self, result: &ModerationResult) -> StoreResult<bool> {
        let done = sqlx::query(
            r#"
            INSERT INTO moderation_results (
                request_id, classification, confidence,
                reasoning, llm_response, source
            )
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (request_id) DO NOTHING
            "#,
        )
        .bind(&result.request_id)
        .bind(result.verdict.classification.as_str())
        .bind(result.verdict.confidence)
        .bind(&result.verdict.reasoning)
        .bind(&result.raw_response)
        .bind(result.source.as_str())
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    async fn get_result(&self, request_id: &str) -> StoreResult<Option<ModerationResult>> {
        let row = sqlx::query(
            r#"
            SELECT
                request_id, classification, confidence,
                reasoning, llm_response, source
            FROM moderation_results
            WHERE request_id = ?
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(result_from_row).transpose()
    }

    async fn mark_completed(&self, request_id: &str) -> StoreResult<()> {
        let done = sqlx::query(
            r#"
            UPDATE moderation_requests
            SET status = 'completed'
            WHERE id = ?
              AND EXISTS (SELECT 1 FROM moderation_results WHERE request_id = ?)
            "#,
        )
        .bind(request_id)
        .bind(request_id)
        .execute(&self.pool)
        .await?;

        if done.rows_affected() == 1 {
            return Ok(());
        }

        match self.get_request(request_id).await? {
            None => Err(StoreError::NotFound(request_id.to_string())),
            Some(_) => Err(StoreError::MissingResult(request_id.to_string())),
        }
    }

    async fn insert_notification(&self, log: &NotificationLog) -> StoreResult<i64> {
        let done = sqlx::query(
            r#"
            INSERT INTO notification_logs (request_id, channel, status, sent_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&log.request_id)
        .bind(&log.channel)
        .bind(&log.status)
        .bind(to_millis(log.sent_at))
        .execute(&self.pool)
        .await?;
        Ok(done.last_insert_rowid())
    }

    async fn notifications_for(&self, request_id: &str) -> StoreResult<Vec<NotificationLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, request_id, channel, status, sent_at
            FROM notification_logs
            WHERE request_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(notification_from_row).collect()
    }

    async fn pending_before(&self, cutoff: DateTime<Utc>, limit: u32) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT id
            FROM moderation_requests
            WHERE status = 'pending' AND created_at < ?
            ORDER BY created_at ASC
            LIMIT ?
            "#,
        )
        .bind(to_millis(cutoff))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| r.try_get("id").map_err(StoreError::from))
            .collect()
    }

    async fn delete_request(&self, id: &str) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM moderation_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() == 1)
    }

    async fn user_summary(&self, user_id: &str) -> StoreResult<UserSummary> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(q.id) AS total_requests,
                COUNT(r.request_id) AS total_results,
                COALESCE(SUM(CASE WHEN r.classification = 'SAFE' THEN 1 ELSE 0 END), 0) AS safe_count,
                COALESCE(SUM(CASE WHEN r.classification = 'INAPPROPRIATE' THEN 1 ELSE 0 END), 0) AS inappropriate_count
            FROM moderation_requests q
            LEFT JOIN moderation_results r ON r.request_id = q.id
            WHERE q.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let count = |col: &str| -> StoreResult<u64> {
            let n: i64 = row.try_get(col)?;
            Ok(n.max(0) as u64)
        };

        Ok(UserSummary {
            total_requests: count("total_requests")?,
            total_results: count("total_results")?,
            safe_count: count("safe_count")?,
            inappropriate_count: count("inappropriate_count")?,
        })
    }
}
