//! Testing utilities and mock implementations
//!
//! Mock versions of the scraper and notifier seams let sync passes run
//! against an in-memory catalog without a network.
//!
//! # Example
//!
//! ```rust,ignore
//! use watchlist_notifier::testing::{fixtures, MockContinueSource, MockNotifier};
//!
//! let source = MockContinueSource::new();
//! source.set_items(vec![fixtures::new_series_item(101)]).await;
//!
//! let notifier = MockNotifier::new();
//! // Build a SyncEngine around Arc::new(source.clone()), run a pass...
//! assert_eq!(notifier.new_content_calls().await.len(), 1);
//! ```

mod mock_notifier;
mod mock_source;

pub use fixtures::{new_series_item, watch_next_item, watched_item};
pub use mock_notifier::{MockNotifier, RecordedNewContent};
pub use mock_source::MockContinueSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::model::{LastSeasonInfo, MovieState, ScrapedItem};

    /// Link used by fixture items
    pub fn item_link(id: i64) -> String {
        format!("https://rezka.example/series/{}-show.html", id)
    }

    /// A `NewSeriesAvailable` row as the continue page would list it.
    pub fn new_series_item(id: i64) -> ScrapedItem {
        ScrapedItem {
            id,
            title: format!("Show {}", id),
            info: "Доступна 5 серия".to_string(),
            link: Some(format!("{}#t:1-s:1-e:5", item_link(id))),
            state: MovieState::NewSeriesAvailable,
            last_season: None,
            last_episode: None,
        }
    }

    /// A `WatchNext` row with the season/episode parsed from its info text.
    pub fn watch_next_item(id: i64, season: i32, episode: i32) -> ScrapedItem {
        ScrapedItem {
            id,
            title: format!("Show {}", id),
            info: format!("Следующая: {} серия {} сезона", episode, season),
            link: Some(item_link(id)),
            state: MovieState::WatchNext,
            last_season: Some(season),
            last_episode: Some(episode),
        }
    }

    /// A fully watched row.
    pub fn watched_item(id: i64) -> ScrapedItem {
        ScrapedItem {
            id,
            title: format!("Film {}", id),
            info: "Просмотрено".to_string(),
            link: Some(item_link(id)),
            state: MovieState::Watched,
            last_season: None,
            last_episode: None,
        }
    }

    /// Detail-page result with both values present.
    pub fn season_info(season: i32, episode: i32) -> LastSeasonInfo {
        LastSeasonInfo {
            last_season: Some(season),
            last_episode: Some(episode),
        }
    }
}
