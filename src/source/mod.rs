//! Continue-watching scraper
//!
//! This module fetches and parses the site's pages:
//! - `fetcher`: HTTP client with the session cookies
//! - `classifier`: heuristic row state classification
//! - `continue_page` / `detail_page`: HTML extraction
//! - `client`: the `ContinueSource` seam used by the sync engine

pub mod classifier;
pub mod client;
pub mod continue_page;
pub mod detail_page;
pub mod fetcher;

pub use classifier::{parse_episode_season, MarkerClassifier, RowMarkup, StateClassifier};
pub use client::{ContinueScraper, ContinueSource};
pub use continue_page::{is_not_logged_in, parse_continue_items};
pub use detail_page::parse_last_season_info;
pub use fetcher::{build_http_client, PageFetcher};
