//! Detail lookup retries
//!
//! Detail pages are fetched one title at a time and the site occasionally
//! drops requests, so each lookup gets a fixed number of retries with a
//! fixed delay in between.

use crate::config::SyncConfig;
use crate::model::LastSeasonInfo;
use crate::source::ContinueSource;
use crate::{NotifierError, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry budget for one detail lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt
    pub retries: u32,

    /// Delay before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            retries: config.detail_retries,
            delay: Duration::from_millis(config.detail_retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Looks up a title's last season/episode, retrying failed attempts
///
/// # Returns
///
/// * `Ok(LastSeasonInfo)` - One of the attempts succeeded
/// * `Err(NotifierError::DetailFetch)` - Every attempt failed
/// * `Err(NotifierError::Cancelled)` - Cancelled while waiting to retry
pub async fn last_season_info_with_retry(
    source: &dyn ContinueSource,
    link: &str,
    policy: RetryPolicy,
    cancel: &CancellationToken,
) -> Result<LastSeasonInfo> {
    let mut errors = 0u32;

    loop {
        let error = match source.last_season_info(link).await {
            Ok(info) => return Ok(info),
            Err(NotifierError::Cancelled) => return Err(NotifierError::Cancelled),
            Err(e) => e,
        };

        errors += 1;
        tracing::warn!(
            "Detail lookup for {} failed ({} of {} attempts): {}",
            link,
            errors,
            policy.retries + 1,
            error
        );

        if errors > policy.retries {
            return Err(NotifierError::DetailFetch {
                link: link.to_string(),
                message: error.to_string(),
            });
        }

        tracing::debug!("Retrying {} in {} ms", link, policy.delay.as_millis());
        tokio::select! {
            _ = cancel.cancelled() => return Err(NotifierError::Cancelled),
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }
}
