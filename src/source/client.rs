//! Scraper client
//!
//! Ties the page fetcher to the continue and detail page parsers. Parsed
//! documents are only used after the last await point of each lookup.

use crate::config::{Config, MarkerConfig};
use crate::model::{LastSeasonInfo, ScrapedItem};
use crate::source::classifier::{MarkerClassifier, StateClassifier};
use crate::source::continue_page::{is_not_logged_in, parse_continue_items};
use crate::source::detail_page::parse_last_season_info;
use crate::source::fetcher::PageFetcher;
use crate::{NotifierError, Result};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;

/// Source of the continue-watching snapshot and per-title details
#[async_trait]
pub trait ContinueSource: Send + Sync {
    /// Lists every row of the continue page, in document order
    ///
    /// Returns an empty list when the page has no rows and
    /// `NotifierError::Auth` when the session is not logged in.
    async fn list_continue_items(&self) -> Result<Vec<ScrapedItem>>;

    /// Looks up the last season/episode on a title's detail page
    async fn last_season_info(&self, link: &str) -> Result<LastSeasonInfo>;
}

/// HTML scraper for the continue-watching page
pub struct ContinueScraper {
    fetcher: PageFetcher,
    continue_path: String,
    not_logged_in: String,
    classifier: Arc<dyn StateClassifier>,
}

impl ContinueScraper {
    /// Creates a scraper with a marker classifier built from the config
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = PageFetcher::new(&config.source)?;
        let classifier = Arc::new(MarkerClassifier::new(&config.markers));
        Ok(Self::with_classifier(
            fetcher,
            &config.source.continue_path,
            &config.markers,
            classifier,
        ))
    }

    /// Creates a scraper around an existing fetcher and classifier
    pub fn with_classifier(
        fetcher: PageFetcher,
        continue_path: &str,
        markers: &MarkerConfig,
        classifier: Arc<dyn StateClassifier>,
    ) -> Self {
        Self {
            fetcher,
            continue_path: continue_path.to_string(),
            not_logged_in: markers.not_logged_in.clone(),
            classifier,
        }
    }

    fn scrape_continue_page(&self, document: &Html) -> Result<Vec<ScrapedItem>> {
        if is_not_logged_in(document, &self.not_logged_in)? {
            return Err(NotifierError::Auth(format!(
                "continue page at '{}' shows the login message",
                self.continue_path
            )));
        }

        parse_continue_items(document, self.classifier.as_ref())
    }
}

impl std::fmt::Debug for ContinueScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinueScraper")
            .field("fetcher", &self.fetcher)
            .field("continue_path", &self.continue_path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContinueSource for ContinueScraper {
    async fn list_continue_items(&self) -> Result<Vec<ScrapedItem>> {
        let document = self.fetcher.fetch(&self.continue_path).await?;
        let items = self.scrape_continue_page(&document)?;

        tracing::debug!("Continue page listed {} rows", items.len());
        Ok(items)
    }

    async fn last_season_info(&self, link: &str) -> Result<LastSeasonInfo> {
        let document = self.fetcher.fetch(link).await?;
        parse_last_season_info(&document)
    }
}
