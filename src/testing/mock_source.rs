//! Mock continue-page source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::model::{LastSeasonInfo, ScrapedItem};
use crate::source::ContinueSource;
use crate::{NotifierError, Result};

/// Mock implementation of the `ContinueSource` trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable continue-page snapshot
/// - Return per-link detail results, optionally after a number of failures
/// - Simulate listing failures and an expired session
/// - Cancel a token once a number of listings were served
/// - Track calls for assertions
///
/// Clones share their state, so a test can keep a handle after giving a
/// clone to the engine.
#[derive(Clone)]
pub struct MockContinueSource {
    items: Arc<RwLock<Vec<ScrapedItem>>>,
    details: Arc<RwLock<HashMap<String, LastSeasonInfo>>>,
    detail_failures: Arc<RwLock<HashMap<String, u32>>>,
    listing_failures: Arc<RwLock<u32>>,
    auth_expired: Arc<RwLock<bool>>,
    list_calls: Arc<RwLock<usize>>,
    detail_calls: Arc<RwLock<Vec<String>>>,
    cancel_after: Arc<RwLock<Option<(usize, CancellationToken)>>>,
}

impl std::fmt::Debug for MockContinueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockContinueSource")
            .field("items", &"<items>")
            .field("details", &"<details>")
            .field("detail_failures", &"<detail_failures>")
            .field("listing_failures", &"<listing_failures>")
            .field("auth_expired", &"<auth_expired>")
            .field("cancel_after", &"<cancel_after>")
            .finish()
    }
}

impl Default for MockContinueSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContinueSource {
    /// Create a new mock with an empty continue page.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            detail_failures: Arc::new(RwLock::new(HashMap::new())),
            listing_failures: Arc::new(RwLock::new(0)),
            auth_expired: Arc::new(RwLock::new(false)),
            list_calls: Arc::new(RwLock::new(0)),
            detail_calls: Arc::new(RwLock::new(Vec::new())),
            cancel_after: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the snapshot returned by subsequent listings.
    pub async fn set_items(&self, items: Vec<ScrapedItem>) {
        *self.items.write().await = items;
    }

    /// Set the detail result for a link.
    pub async fn set_detail(&self, link: &str, info: LastSeasonInfo) {
        self.details.write().await.insert(link.to_string(), info);
    }

    /// Make the next `times` detail lookups of a link fail.
    pub async fn fail_detail_times(&self, link: &str, times: u32) {
        self.detail_failures
            .write()
            .await
            .insert(link.to_string(), times);
    }

    /// Make the next `times` listings fail with a server error.
    pub async fn fail_listing_times(&self, times: u32) {
        *self.listing_failures.write().await = times;
    }

    /// Make every listing report an expired session.
    pub async fn fail_listing_with_auth(&self) {
        *self.auth_expired.write().await = true;
    }

    /// Cancel `token` when the `listings`-th listing is requested.
    pub async fn cancel_after_listings(&self, listings: usize, token: CancellationToken) {
        *self.cancel_after.write().await = Some((listings, token));
    }

    /// Number of listings requested so far.
    pub async fn list_calls(&self) -> usize {
        *self.list_calls.read().await
    }

    /// Links of all detail lookups, in call order.
    pub async fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.read().await.clone()
    }

    /// Number of detail lookups made for one link.
    pub async fn detail_calls_for(&self, link: &str) -> usize {
        self.detail_calls
            .read()
            .await
            .iter()
            .filter(|called| called.as_str() == link)
            .count()
    }
}

#[async_trait]
impl ContinueSource for MockContinueSource {
    async fn list_continue_items(&self) -> Result<Vec<ScrapedItem>> {
        let calls = {
            let mut list_calls = self.list_calls.write().await;
            *list_calls += 1;
            *list_calls
        };

        if let Some((listings, token)) = self.cancel_after.read().await.as_ref() {
            if calls >= *listings {
                token.cancel();
            }
        }

        if *self.auth_expired.read().await {
            return Err(NotifierError::Auth(
                "continue page shows the login message".to_string(),
            ));
        }

        {
            let mut failures = self.listing_failures.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(NotifierError::Fetch {
                    url: "https://rezka.example/continue/".to_string(),
                    status: 503,
                    reason: "Service Unavailable".to_string(),
                });
            }
        }

        Ok(self.items.read().await.clone())
    }

    async fn last_season_info(&self, link: &str) -> Result<LastSeasonInfo> {
        self.detail_calls.write().await.push(link.to_string());

        {
            let mut failures = self.detail_failures.write().await;
            if let Some(remaining) = failures.get_mut(link) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(NotifierError::Fetch {
                        url: link.to_string(),
                        status: 500,
                        reason: "Internal Server Error".to_string(),
                    });
                }
            }
        }

        Ok(self
            .details
            .read()
            .await
            .get(link)
            .copied()
            .unwrap_or_default())
    }
}
