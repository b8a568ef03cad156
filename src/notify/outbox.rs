//! Markdown outbox notifier
//!
//! Appends each notification as a dated markdown section to a file. Another
//! process (a mailer, a chat bridge) can pick the digests up from there.

use crate::model::ScrapedItem;
use crate::notify::{Notifier, NEW_CONTENT_SUBJECT};
use crate::output::{format_error_digest, format_new_content_digest};
use crate::{NotifierError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Appends notifications to a markdown file
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    path: PathBuf,
    recipient_name: Option<String>,
}

impl OutboxNotifier {
    pub fn new(path: impl AsRef<Path>, recipient_name: Option<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            recipient_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, subject: &str, body: &str) -> String {
        let mut entry = format!("## {} ({})\n\n", subject, Utc::now().to_rfc3339());
        if let Some(name) = &self.recipient_name {
            entry.push_str(&format!("Hi {},\n\n", name));
        }
        entry.push_str(body);
        if !body.ends_with('\n') {
            entry.push('\n');
        }
        entry.push('\n');
        entry
    }

    async fn append(&self, entry: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.outbox_error("open", e))?;

        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| self.outbox_error("write", e))?;
        file.flush()
            .await
            .map_err(|e| self.outbox_error("flush", e))?;
        Ok(())
    }

    fn outbox_error(&self, action: &str, e: std::io::Error) -> NotifierError {
        NotifierError::Notify(format!(
            "failed to {} outbox {}: {}",
            action,
            self.path.display(),
            e
        ))
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn notify_new_content(
        &self,
        new_series: &[ScrapedItem],
        new_seasons: &[ScrapedItem],
    ) -> Result<()> {
        tracing::info!("Writing new content digest to {}", self.path.display());

        let body = format_new_content_digest(new_series, new_seasons);
        self.append(&self.render(NEW_CONTENT_SUBJECT, &body)).await
    }

    async fn notify_error(&self, title: &str, detail: &str) -> Result<()> {
        tracing::info!("Writing error digest '{}' to {}", title, self.path.display());

        let body = format_error_digest(title, detail);
        self.append(&self.render(title, &body)).await
    }
}
