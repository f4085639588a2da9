//! On-disk database tests

use modguard_core::{
    Classification, ModerationRequest, ModerationResult, RequestStatus, Verdict, VerdictSource,
};
use modguard_store::{ModerationStore, SqliteStore};

#[tokio::test]
async fn data_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("modguard.db").display());

    let request = ModerationRequest::text("owner@example.com", "persist me");
    {
        let store = SqliteStore::connect(&url, 2).await.unwrap();
        store.insert_request(&request).await.unwrap();
        store
            .insert_result(&ModerationResult::new(
                &request.id,
                Verdict::new(Classification::Safe, 0.95, "benign"),
                VerdictSource::Structured,
                "{}",
            ))
            .await
            .unwrap();
        store.mark_completed(&request.id).await.unwrap();
        store.pool().close().await;
    }

    let store = SqliteStore::connect(&url, 2).await.unwrap();
    let loaded = store.get_request(&request.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, RequestStatus::Completed);
    assert_eq!(loaded.text_content(), "persist me");

    let result = store.get_result(&request.id).await.unwrap().unwrap();
    assert_eq!(result.verdict.reasoning, "benign");
    assert!((result.verdict.confidence - 0.95).abs() < f64::EPSILON);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("twice.db").display());

    let store = SqliteStore::connect(&url, 1).await.unwrap();
    store.migrate().await.unwrap();
    store.migrate().await.unwrap();
}
