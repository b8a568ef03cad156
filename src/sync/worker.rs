//! Periodic sync worker

use crate::config::SyncConfig;
use crate::notify::Notifier;
use crate::storage::CatalogStore;
use crate::sync::SyncEngine;
use crate::{NotifierError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Title of the notification sent when the worker gives up
pub const SYNC_ERROR_TITLE: &str = "Error while syncing movies";

/// Title of the notification sent when the session has expired
pub const AUTH_ERROR_TITLE: &str = "Session expired while syncing movies";

/// Runs sync passes on a fixed interval
///
/// Consecutive failed passes are retried on the next tick. Once more than
/// `max_pass_retries` passes in a row have failed, or as soon as a pass
/// reports an expired session, the worker sends an error notification and
/// stops.
pub struct Worker<S: CatalogStore> {
    engine: SyncEngine<S>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    max_pass_retries: u32,
}

impl<S: CatalogStore> Worker<S> {
    pub fn new(engine: SyncEngine<S>, config: &SyncConfig) -> Self {
        let notifier = engine.notifier();
        Self {
            engine,
            notifier,
            interval: Duration::from_secs(config.interval_minutes.saturating_mul(60)),
            max_pass_retries: config.max_pass_retries,
        }
    }

    /// Overrides the time between passes
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn engine(&self) -> &SyncEngine<S> {
        &self.engine
    }

    /// Runs until cancelled or until it gives up
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Stopped by the cancellation token
    /// * `Err(NotifierError)` - The error that made the worker stop
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<()> {
        let mut failures = 0u32;

        while !cancel.is_cancelled() {
            tracing::info!("Worker running at {}", chrono::Local::now().to_rfc3339());

            match self.engine.sync_once(cancel).await {
                Ok(_) => failures = 0,
                Err(NotifierError::Cancelled) => break,
                Err(e) if e.is_auth() => {
                    tracing::error!("Session is no longer valid, stopping worker: {}", e);
                    self.send_error(AUTH_ERROR_TITLE, &e).await;
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(
                        "Error while syncing movies. Retry count: {}. {}",
                        failures,
                        e
                    );

                    if failures >= self.max_pass_retries {
                        tracing::error!(
                            "Max retries count reached. Stopping worker until the error is fixed"
                        );
                        self.send_error(SYNC_ERROR_TITLE, &e).await;
                        return Err(e);
                    }

                    failures += 1;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Worker stopped");
        Ok(())
    }

    async fn send_error(&self, title: &str, error: &NotifierError) {
        if let Err(e) = self.notifier.notify_error(title, &error.to_string()).await {
            tracing::error!("Error while sending error notification: {}", e);
        }
    }
}
