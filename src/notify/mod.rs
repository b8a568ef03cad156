//! Notification delivery
//!
//! The sync engine and the worker report through the `Notifier` seam.
//! Two channels ship with the crate: `LogNotifier` writes digests to the
//! log, `OutboxNotifier` appends them to a markdown file.

mod log;
mod outbox;

pub use self::log::LogNotifier;
pub use outbox::OutboxNotifier;

use crate::config::NotifyConfig;
use crate::model::ScrapedItem;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Subject of the new-content notification
pub const NEW_CONTENT_SUBJECT: &str = "New series available";

/// Outbound notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announces new series and new seasons found by a pass
    ///
    /// A failure here fails the pass, so the catalog changes of the pass
    /// are rolled back and the same content is announced again next time.
    async fn notify_new_content(
        &self,
        new_series: &[ScrapedItem],
        new_seasons: &[ScrapedItem],
    ) -> Result<()>;

    /// Reports an error that stopped the worker
    async fn notify_error(&self, title: &str, detail: &str) -> Result<()>;
}

/// Builds the notifier selected by the `[notify]` section
///
/// An outbox path selects `OutboxNotifier`, otherwise digests only go to
/// the log.
pub fn build_notifier(config: &NotifyConfig) -> Arc<dyn Notifier> {
    match &config.outbox_path {
        Some(path) => Arc::new(OutboxNotifier::new(path, config.recipient_name.clone())),
        None => Arc::new(LogNotifier::new()),
    }
}
