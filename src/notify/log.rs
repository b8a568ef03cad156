//! Log-only notifier

use crate::model::ScrapedItem;
use crate::notify::{Notifier, NEW_CONTENT_SUBJECT};
use crate::output::{format_error_digest, format_new_content_digest};
use crate::Result;
use async_trait::async_trait;

/// Writes notification digests to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_new_content(
        &self,
        new_series: &[ScrapedItem],
        new_seasons: &[ScrapedItem],
    ) -> Result<()> {
        tracing::info!(
            "{}\n{}",
            NEW_CONTENT_SUBJECT,
            format_new_content_digest(new_series, new_seasons)
        );
        Ok(())
    }

    async fn notify_error(&self, title: &str, detail: &str) -> Result<()> {
        tracing::error!("{}", format_error_digest(title, detail).trim_end());
        Ok(())
    }
}
