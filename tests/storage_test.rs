//! Storage integration tests — snapshot persistence against a real SQLite
//! file in a temp directory.

use pulsed::analytics::storage::AnalyticsStorage;
use pulsed::analytics::{KeywordReport, Snapshot};
use pulsed::storage::Storage;
use tempfile::TempDir;

fn snapshot(timestamp: &str) -> Snapshot {
    Snapshot {
        timestamp: timestamp.to_string(),
        data: vec![KeywordReport::failed("BTC", "placeholder".to_string())],
    }
}

#[tokio::test]
async fn schema_bootstrap_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let _first = Storage::new(dir.path()).await.unwrap();
    // Opening the same directory again must not fail on existing tables.
    let second = Storage::new(dir.path()).await.unwrap();
    second.ping().await.unwrap();
}

#[tokio::test]
async fn latest_snapshot_on_empty_store_is_none() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let analytics = AnalyticsStorage::new(storage.pool());

    assert!(analytics.latest_snapshot().await.unwrap().is_none());
    assert_eq!(analytics.snapshot_count().await.unwrap(), 0);
}

#[tokio::test]
async fn insert_then_latest_roundtrips_the_document() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let analytics = AnalyticsStorage::new(storage.pool());

    analytics
        .insert_snapshot(&snapshot("2026-02-25T02:35:00+00:00"))
        .await
        .unwrap();

    let loaded = analytics.latest_snapshot().await.unwrap().unwrap();
    assert_eq!(loaded.timestamp, "2026-02-25T02:35:00+00:00");
    assert_eq!(loaded.data.len(), 1);
    assert_eq!(loaded.data[0].keyword, "BTC");
    assert_eq!(loaded.data[0].error.as_deref(), Some("placeholder"));
}

#[tokio::test]
async fn latest_follows_captured_at_not_insert_order() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let analytics = AnalyticsStorage::new(storage.pool());

    // Insert out of chronological order.
    analytics
        .insert_snapshot(&snapshot("2026-02-25T02:35:00+00:00"))
        .await
        .unwrap();
    analytics
        .insert_snapshot(&snapshot("2026-02-20T02:35:00+00:00"))
        .await
        .unwrap();

    let loaded = analytics.latest_snapshot().await.unwrap().unwrap();
    assert_eq!(loaded.timestamp, "2026-02-25T02:35:00+00:00");
    assert_eq!(analytics.snapshot_count().await.unwrap(), 2);
}

#[tokio::test]
async fn prune_removes_only_old_snapshots() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let analytics = AnalyticsStorage::new(storage.pool());

    let recent = chrono::Utc::now().to_rfc3339();
    let ancient = (chrono::Utc::now() - chrono::Duration::days(400)).to_rfc3339();

    analytics.insert_snapshot(&snapshot(&recent)).await.unwrap();
    analytics.insert_snapshot(&snapshot(&ancient)).await.unwrap();

    let pruned = analytics.prune_older_than(90).await.unwrap();
    assert_eq!(pruned, 1);
    assert_eq!(analytics.snapshot_count().await.unwrap(), 1);

    let survivor = analytics.latest_snapshot().await.unwrap().unwrap();
    assert_eq!(survivor.timestamp, recent);
}

#[tokio::test]
async fn prune_with_zero_days_is_disabled() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let analytics = AnalyticsStorage::new(storage.pool());

    let ancient = (chrono::Utc::now() - chrono::Duration::days(400)).to_rfc3339();
    analytics.insert_snapshot(&snapshot(&ancient)).await.unwrap();

    assert_eq!(analytics.prune_older_than(0).await.unwrap(), 0);
    assert_eq!(analytics.snapshot_count().await.unwrap(), 1);
}

#[tokio::test]
async fn vacuum_runs_after_prune() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path()).await.unwrap();
    let analytics = AnalyticsStorage::new(storage.pool());

    analytics
        .insert_snapshot(&snapshot("2026-02-25T02:35:00+00:00"))
        .await
        .unwrap();
    analytics.prune_older_than(90).await.unwrap();
    storage.vacuum().await.unwrap();
}
