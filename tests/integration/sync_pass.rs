//! Integration tests for sync passes
//!
//! These tests drive the sync engine with the mock source and notifier
//! against a SQLite catalog on disk.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use watchlist_notifier::config::SyncConfig;
use watchlist_notifier::storage::PassStatus;
use watchlist_notifier::testing::fixtures::{item_link, season_info};
use watchlist_notifier::testing::{
    new_series_item, watch_next_item, watched_item, MockContinueSource, MockNotifier,
};
use watchlist_notifier::{CatalogStore, NotifierError, SqliteCatalog, SyncEngine};

fn quick_config() -> SyncConfig {
    SyncConfig {
        detail_retry_delay_ms: 1,
        ..SyncConfig::default()
    }
}

fn create_engine(
    db_path: &Path,
    source: &MockContinueSource,
    notifier: &MockNotifier,
) -> SyncEngine<SqliteCatalog> {
    SyncEngine::new(
        SqliteCatalog::new(db_path).unwrap(),
        Arc::new(source.clone()),
        Arc::new(notifier.clone()),
        quick_config(),
        "integration-hash",
    )
}

fn ids(values: &[i64]) -> HashSet<i64> {
    values.iter().copied().collect()
}

#[tokio::test]
async fn test_new_series_is_tracked_and_notified() {
    let dir = TempDir::new().unwrap();
    let source = MockContinueSource::new();
    source
        .set_items(vec![new_series_item(101), watched_item(303)])
        .await;
    let notifier = MockNotifier::new();
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.new_series.len(), 1);
    assert_eq!(outcome.new_series[0].id, 101);

    let calls = notifier.new_content_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].new_series[0].id, 101);
    assert!(calls[0].new_seasons.is_empty());

    let record = engine.store().get_record(101).unwrap().unwrap();
    assert!(record.notified);
    assert!(record.notified_at.is_some());
    assert_eq!(record.title, "Show 101");

    // Watched rows are never tracked
    assert!(engine.store().get_record(303).unwrap().is_none());
}

#[tokio::test]
async fn test_same_snapshot_notifies_once() {
    let dir = TempDir::new().unwrap();
    let source = MockContinueSource::new();
    source.set_items(vec![new_series_item(101)]).await;
    let notifier = MockNotifier::new();
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    let first = engine.sync_once(&CancellationToken::new()).await.unwrap();
    let notified_at = engine.store().get_record(101).unwrap().unwrap().notified_at;

    let second = engine.sync_once(&CancellationToken::new()).await.unwrap();

    assert!(first.has_new_content());
    assert!(!second.has_new_content());
    assert_eq!(notifier.new_content_calls().await.len(), 1);
    assert_eq!(engine.store().count_records().unwrap(), 1);

    // notified_at is stamped once and never moves
    let record = engine.store().get_record(101).unwrap().unwrap();
    assert!(record.notified);
    assert_eq!(record.notified_at, notified_at);
}

#[tokio::test]
async fn test_watermark_accepted_then_rejected() {
    let dir = TempDir::new().unwrap();
    let link = item_link(202);
    let source = MockContinueSource::new();
    source.set_items(vec![watch_next_item(202, 2, 2)]).await;
    let notifier = MockNotifier::new();
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    // First sighting: tracked, and (2,2) beats the empty watermark
    source.set_detail(&link, season_info(2, 2)).await;
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.new_seasons.len(), 1);
    let record = engine.store().get_record(202).unwrap().unwrap();
    assert_eq!((record.last_season, record.last_episode), (Some(2), Some(2)));

    // (2,2) -> (2,3) is accepted
    source.set_detail(&link, season_info(2, 3)).await;
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.new_seasons.len(), 1);
    assert_eq!(outcome.new_seasons[0].id, 202);
    let record = engine.store().get_record(202).unwrap().unwrap();
    assert_eq!((record.last_season, record.last_episode), (Some(2), Some(3)));

    // (2,3) -> (1,9) goes backwards and is rejected
    source.set_detail(&link, season_info(1, 9)).await;
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();
    assert!(outcome.new_seasons.is_empty());
    let record = engine.store().get_record(202).unwrap().unwrap();
    assert_eq!((record.last_season, record.last_episode), (Some(2), Some(3)));

    // Same value again is not new either
    source.set_detail(&link, season_info(2, 3)).await;
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();
    assert!(outcome.new_seasons.is_empty());

    assert_eq!(notifier.new_content_calls().await.len(), 2);
}

#[tokio::test]
async fn test_new_season_resets_episode() {
    let dir = TempDir::new().unwrap();
    let link = item_link(7);
    let source = MockContinueSource::new();
    source.set_items(vec![watch_next_item(7, 1, 10)]).await;
    let notifier = MockNotifier::new();
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    source.set_detail(&link, season_info(1, 10)).await;
    engine.sync_once(&CancellationToken::new()).await.unwrap();

    source.set_detail(&link, season_info(2, 1)).await;
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.new_seasons.len(), 1);
    let record = engine.store().get_record(7).unwrap().unwrap();
    assert_eq!((record.last_season, record.last_episode), (Some(2), Some(1)));
}

#[tokio::test]
async fn test_zero_episode_is_never_accepted() {
    let dir = TempDir::new().unwrap();
    let link = item_link(8);
    let source = MockContinueSource::new();
    source.set_items(vec![watch_next_item(8, 1, 1)]).await;
    source.set_detail(&link, season_info(3, 0)).await;
    let notifier = MockNotifier::new();
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();

    assert!(outcome.new_seasons.is_empty());
    let record = engine.store().get_record(8).unwrap().unwrap();
    assert_eq!((record.last_season, record.last_episode), (None, None));
    assert!(notifier.new_content_calls().await.is_empty());
}

#[tokio::test]
async fn test_failing_detail_lookup_is_skipped() {
    let dir = TempDir::new().unwrap();
    let broken = item_link(202);
    let working = item_link(303);
    let source = MockContinueSource::new();
    source
        .set_items(vec![
            new_series_item(101),
            watch_next_item(202, 2, 3),
            watch_next_item(303, 1, 4),
        ])
        .await;
    source.fail_detail_times(&broken, 100).await;
    source.set_detail(&working, season_info(1, 5)).await;
    let notifier = MockNotifier::new();
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();

    // First attempt plus five retries, then the title is skipped
    assert_eq!(source.detail_calls_for(&broken).await, 6);
    assert_eq!(outcome.skipped_items, 1);
    assert_eq!(outcome.new_series.len(), 1);
    assert_eq!(outcome.new_seasons.len(), 1);
    assert_eq!(outcome.new_seasons[0].id, 303);

    // The pass still committed
    let existing = engine.store().find_existing_ids(&ids(&[101, 202, 303])).unwrap();
    assert_eq!(existing, ids(&[101, 202, 303]));
    let record = engine.store().get_record(202).unwrap().unwrap();
    assert_eq!((record.last_season, record.last_episode), (None, None));

    let pass = engine.store().get_latest_pass().unwrap().unwrap();
    assert_eq!(pass.status, PassStatus::Completed);
    assert_eq!(pass.counts.skipped_items, 1);
}

#[tokio::test]
async fn test_notifier_failure_rolls_back() {
    let dir = TempDir::new().unwrap();
    let link = item_link(202);
    let source = MockContinueSource::new();
    source
        .set_items(vec![new_series_item(101), watch_next_item(202, 2, 3)])
        .await;
    source.set_detail(&link, season_info(2, 3)).await;
    let notifier = MockNotifier::new();
    notifier.set_fail(true).await;
    let mut engine = create_engine(&dir.path().join("catalog.db"), &source, &notifier);

    let result = engine.sync_once(&CancellationToken::new()).await;

    assert!(matches!(result, Err(NotifierError::Notify(_))));
    assert_eq!(engine.store().count_records().unwrap(), 0);
    let pass = engine.store().get_latest_pass().unwrap().unwrap();
    assert_eq!(pass.status, PassStatus::Failed);

    // Once delivery works again the same content is announced
    notifier.set_fail(false).await;
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.new_series.len(), 1);
    assert_eq!(outcome.new_seasons.len(), 1);
    assert_eq!(notifier.new_content_calls().await.len(), 1);
    assert!(engine.store().get_record(101).unwrap().unwrap().notified);
}

#[tokio::test]
async fn test_catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");
    let source = MockContinueSource::new();
    source.set_items(vec![new_series_item(101)]).await;
    let notifier = MockNotifier::new();

    let mut engine = create_engine(&db_path, &source, &notifier);
    engine.sync_once(&CancellationToken::new()).await.unwrap();
    drop(engine.into_store());

    let mut engine = create_engine(&db_path, &source, &notifier);
    let outcome = engine.sync_once(&CancellationToken::new()).await.unwrap();

    assert!(!outcome.has_new_content());
    assert_eq!(notifier.new_content_calls().await.len(), 1);
    assert_eq!(engine.store().count_notified().unwrap(), 1);
}

#[tokio::test]
async fn test_cancelled_during_detail_retries_rolls_back() {
    let dir = TempDir::new().unwrap();
    let link = item_link(202);
    let source = MockContinueSource::new();
    source
        .set_items(vec![new_series_item(101), watch_next_item(202, 2, 3)])
        .await;
    source.fail_detail_times(&link, 100).await;
    let notifier = MockNotifier::new();

    let config = SyncConfig {
        detail_retry_delay_ms: 60_000,
        ..SyncConfig::default()
    };
    let mut engine = SyncEngine::new(
        SqliteCatalog::new(&dir.path().join("catalog.db")).unwrap(),
        Arc::new(source.clone()),
        Arc::new(notifier.clone()),
        config,
        "integration-hash",
    );

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        stopper.cancel();
    });

    let result = engine.sync_once(&cancel).await;

    assert!(matches!(result, Err(NotifierError::Cancelled)));
    assert_eq!(engine.store().count_records().unwrap(), 0);
    assert!(notifier.new_content_calls().await.is_empty());
    let pass = engine.store().get_latest_pass().unwrap().unwrap();
    assert_eq!(pass.status, PassStatus::Cancelled);
}
