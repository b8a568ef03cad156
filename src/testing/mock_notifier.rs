//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::ScrapedItem;
use crate::notify::Notifier;
use crate::{NotifierError, Result};

/// A recorded new-content notification.
#[derive(Debug, Clone)]
pub struct RecordedNewContent {
    pub new_series: Vec<ScrapedItem>,
    pub new_seasons: Vec<ScrapedItem>,
}

/// Mock implementation of the `Notifier` trait.
///
/// Records every notification and can be told to fail, which lets tests
/// check that a failed delivery rolls the pass back. Clones share state.
#[derive(Clone)]
pub struct MockNotifier {
    new_content: Arc<RwLock<Vec<RecordedNewContent>>>,
    errors: Arc<RwLock<Vec<(String, String)>>>,
    fail: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for MockNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNotifier")
            .field("new_content", &"<new_content>")
            .field("errors", &"<errors>")
            .field("fail", &"<fail>")
            .finish()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            new_content: Arc::new(RwLock::new(Vec::new())),
            errors: Arc::new(RwLock::new(Vec::new())),
            fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Make subsequent notifications fail (or succeed again).
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Delivered new-content notifications.
    pub async fn new_content_calls(&self) -> Vec<RecordedNewContent> {
        self.new_content.read().await.clone()
    }

    /// Delivered error notifications as (title, detail).
    pub async fn error_calls(&self) -> Vec<(String, String)> {
        self.errors.read().await.clone()
    }

    async fn check_fail(&self) -> Result<()> {
        if *self.fail.read().await {
            return Err(NotifierError::Notify("mock delivery failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify_new_content(
        &self,
        new_series: &[ScrapedItem],
        new_seasons: &[ScrapedItem],
    ) -> Result<()> {
        self.check_fail().await?;
        self.new_content.write().await.push(RecordedNewContent {
            new_series: new_series.to_vec(),
            new_seasons: new_seasons.to_vec(),
        });
        Ok(())
    }

    async fn notify_error(&self, title: &str, detail: &str) -> Result<()> {
        self.check_fail().await?;
        self.errors
            .write()
            .await
            .push((title.to_string(), detail.to_string()));
        Ok(())
    }
}
