//! Sync pass engine
//!
//! One pass takes the continue-page snapshot, tracks titles that are new to
//! the catalog, advances progression watermarks from detail pages and sends
//! one notification for everything found. Catalog writes of a pass happen in
//! a single transaction that is rolled back if any step fails, the
//! notification included.

use crate::config::SyncConfig;
use crate::model::{MovieRecord, MovieState, ScrapedItem};
use crate::notify::Notifier;
use crate::output::format_record_table;
use crate::source::ContinueSource;
use crate::storage::{CatalogStore, PassCounts, PassStatus};
use crate::sync::retry::{last_season_info_with_retry, RetryPolicy};
use crate::{NotifierError, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a committed pass found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Rows of titles that started being tracked as new series
    pub new_series: Vec<ScrapedItem>,

    /// Rows of tracked titles whose watermark advanced
    pub new_seasons: Vec<ScrapedItem>,

    /// Titles whose detail lookup failed or had no link
    pub skipped_items: usize,
}

impl PassOutcome {
    /// Returns true if the pass produced anything to announce
    pub fn has_new_content(&self) -> bool {
        !self.new_series.is_empty() || !self.new_seasons.is_empty()
    }

    pub fn counts(&self) -> PassCounts {
        PassCounts {
            new_series: self.new_series.len(),
            new_seasons: self.new_seasons.len(),
            skipped_items: self.skipped_items,
        }
    }
}

/// Runs sync passes against one catalog
///
/// The engine owns its store, and `sync_once` takes `&mut self`, so passes
/// over the same catalog never overlap.
pub struct SyncEngine<S: CatalogStore> {
    store: S,
    source: Arc<dyn ContinueSource>,
    notifier: Arc<dyn Notifier>,
    config: SyncConfig,
    config_hash: String,
}

impl<S: CatalogStore> SyncEngine<S> {
    pub fn new(
        store: S,
        source: Arc<dyn ContinueSource>,
        notifier: Arc<dyn Notifier>,
        config: SyncConfig,
        config_hash: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            config,
            config_hash: config_hash.into(),
        }
    }

    /// Read access to the catalog
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Notifier shared with the worker
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    /// Runs one sync pass
    ///
    /// The pass is recorded in the pass history whatever its result.
    ///
    /// # Returns
    ///
    /// * `Ok(PassOutcome)` - The pass committed
    /// * `Err(NotifierError::Cancelled)` - Cancelled; catalog changes were rolled back
    /// * `Err(NotifierError)` - The pass failed; catalog changes were rolled back
    pub async fn sync_once(&mut self, cancel: &CancellationToken) -> Result<PassOutcome> {
        let pass_id = self.store.create_pass(&self.config_hash)?;
        tracing::info!("Sync pass {} started", pass_id);

        let result = self.run_pass(cancel).await;

        let (status, counts, error) = match &result {
            Ok(outcome) => (PassStatus::Completed, outcome.counts(), None),
            Err(NotifierError::Cancelled) => (PassStatus::Cancelled, PassCounts::default(), None),
            Err(e) => (PassStatus::Failed, PassCounts::default(), Some(e.to_string())),
        };

        if let Err(e) = self
            .store
            .finish_pass(pass_id, status, counts, error.as_deref())
        {
            tracing::warn!("Failed to record the end of sync pass {}: {}", pass_id, e);
        }

        match &result {
            Ok(outcome) => tracing::info!(
                "Sync pass {} completed: {} new series, {} new seasons, {} skipped",
                pass_id,
                outcome.new_series.len(),
                outcome.new_seasons.len(),
                outcome.skipped_items
            ),
            Err(NotifierError::Cancelled) => tracing::info!("Sync pass {} cancelled", pass_id),
            Err(e) => tracing::error!("Sync pass {} failed: {}", pass_id, e),
        }

        result
    }

    async fn run_pass(&mut self, cancel: &CancellationToken) -> Result<PassOutcome> {
        if cancel.is_cancelled() {
            return Err(NotifierError::Cancelled);
        }

        let items = self.source.list_continue_items().await?;
        tracing::info!("Continue page lists {} titles", items.len());

        self.store.begin()?;

        match self.apply_snapshot(&items, cancel).await {
            Ok(outcome) => match self.store.commit() {
                Ok(()) => Ok(outcome),
                Err(e) => {
                    tracing::error!("Commit failed, rolling back sync pass: {}", e);
                    if let Err(rollback_error) = self.store.rollback() {
                        tracing::error!("Rollback failed: {}", rollback_error);
                    }
                    Err(e.into())
                }
            },
            Err(e) => {
                tracing::error!("Rolling back sync pass: {}", e);
                if let Err(rollback_error) = self.store.rollback() {
                    tracing::error!("Rollback failed: {}", rollback_error);
                }
                Err(e)
            }
        }
    }

    async fn apply_snapshot(
        &mut self,
        items: &[ScrapedItem],
        cancel: &CancellationToken,
    ) -> Result<PassOutcome> {
        let mut outcome = PassOutcome {
            new_series: self.track_new_series(items)?,
            ..PassOutcome::default()
        };

        if self.config.track_progression {
            self.track_progression(items, cancel, &mut outcome).await?;
        }

        if cancel.is_cancelled() {
            return Err(NotifierError::Cancelled);
        }

        if outcome.has_new_content() {
            self.notifier
                .notify_new_content(&outcome.new_series, &outcome.new_seasons)
                .await?;

            let notified: Vec<i64> = outcome.new_series.iter().map(|item| item.id).collect();
            self.store.mark_notified(&notified, Utc::now())?;
        } else {
            tracing::info!("No new content found");
        }

        Ok(outcome)
    }

    /// Inserts records for `NewSeriesAvailable` rows the catalog doesn't know
    ///
    /// Returns the rows of the titles that were inserted.
    fn track_new_series(&mut self, items: &[ScrapedItem]) -> Result<Vec<ScrapedItem>> {
        let candidates = unique_by_id(items, MovieState::NewSeriesAvailable);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: HashSet<i64> = candidates.iter().map(|item| item.id).collect();
        let existing = self.store.find_existing_ids(&ids)?;

        let fresh: Vec<ScrapedItem> = candidates
            .into_iter()
            .filter(|item| !existing.contains(&item.id))
            .cloned()
            .collect();

        self.insert_records(&fresh, "new series")?;
        Ok(fresh)
    }

    /// Checks detail pages of `WatchNext` titles and advances watermarks
    async fn track_progression(
        &mut self,
        items: &[ScrapedItem],
        cancel: &CancellationToken,
        outcome: &mut PassOutcome,
    ) -> Result<()> {
        let candidates = unique_by_id(items, MovieState::WatchNext);
        if candidates.is_empty() {
            return Ok(());
        }

        let ids: HashSet<i64> = candidates.iter().map(|item| item.id).collect();
        let mut snapshot: HashMap<i64, MovieRecord> = self
            .store
            .get_records(&ids)?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        let untracked: Vec<ScrapedItem> = candidates
            .iter()
            .filter(|item| !snapshot.contains_key(&item.id))
            .map(|item| (*item).clone())
            .collect();
        for record in self.insert_records(&untracked, "watch next")? {
            snapshot.insert(record.id, record);
        }

        let policy = RetryPolicy::from_config(&self.config);

        for item in candidates {
            if cancel.is_cancelled() {
                return Err(NotifierError::Cancelled);
            }

            let Some(record) = snapshot.get(&item.id) else {
                continue;
            };

            let Some(link) = item.link.as_deref() else {
                tracing::warn!("Title {} has no link, skipping detail lookup", item.id);
                outcome.skipped_items += 1;
                continue;
            };

            let info = match last_season_info_with_retry(self.source.as_ref(), link, policy, cancel)
                .await
            {
                Ok(info) => info,
                Err(NotifierError::Cancelled) => return Err(NotifierError::Cancelled),
                Err(e) => {
                    tracing::warn!("Skipping title {}: {}", item.id, e);
                    outcome.skipped_items += 1;
                    continue;
                }
            };

            if !record.watermark().accepts(&info) {
                tracing::debug!(
                    "Title {} has nothing new (stored {:?}/{:?}, found {:?}/{:?})",
                    item.id,
                    record.last_season,
                    record.last_episode,
                    info.last_season,
                    info.last_episode
                );
                continue;
            }

            let mut updated = record.clone();
            updated.last_season = info.last_season;
            updated.last_episode = info.last_episode;
            updated.updated_at = Utc::now();
            self.store.update_watermark(&updated)?;

            outcome.new_seasons.push(item.clone());
        }

        if !outcome.new_seasons.is_empty() {
            tracing::info!(
                "Found {} titles with new seasons or episodes",
                outcome.new_seasons.len()
            );
        }

        Ok(())
    }

    fn insert_records(&mut self, items: &[ScrapedItem], kind: &str) -> Result<Vec<MovieRecord>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let records: Vec<MovieRecord> = items
            .iter()
            .map(|item| MovieRecord::from_scraped(item, now))
            .collect();

        self.store.insert_all(&records)?;

        tracing::info!(
            "Tracking {} new {} titles\n{}",
            records.len(),
            kind,
            format_record_table(&records)
        );

        Ok(records)
    }
}

/// Rows in the given state, first occurrence of each id, in document order
fn unique_by_id(items: &[ScrapedItem], state: MovieState) -> Vec<&ScrapedItem> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| item.state == state)
        .filter(|item| seen.insert(item.id))
        .collect()
}
