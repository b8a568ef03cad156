//! Scraped items, catalog records and the progression watermark

use crate::model::MovieState;
use chrono::{DateTime, Utc};

/// One row of the continue page, produced fresh on every pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedItem {
    /// External identifier parsed from the row's DOM id
    pub id: i64,

    /// Title text
    pub title: String,

    /// Free-text secondary line (episode/season progress, availability notes)
    pub info: String,

    /// Navigation URL; which anchor it came from depends on `state`
    pub link: Option<String>,

    /// Classified viewing state
    pub state: MovieState,

    /// Season parsed from `info`, only for `WatchNext` rows
    pub last_season: Option<i32>,

    /// Episode parsed from `info`, only for `WatchNext` rows
    pub last_episode: Option<i32>,
}

/// A persisted catalog entry
///
/// Title, info, link and state are a snapshot taken when the record was
/// created and are not refreshed by later scrapes.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub info: Option<String>,
    pub link: Option<String>,
    pub state: MovieState,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete flag, not touched by the sync engine
    pub is_removed: bool,
    pub last_season: Option<i32>,
    pub last_episode: Option<i32>,
}

impl MovieRecord {
    /// Builds a fresh, not yet notified record from a scraped row
    ///
    /// The watermark starts empty; progression is only recorded once a
    /// detail lookup has been accepted.
    pub fn from_scraped(item: &ScrapedItem, now: DateTime<Utc>) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            info: Some(item.info.clone()).filter(|info| !info.is_empty()),
            link: item.link.clone(),
            state: item.state,
            notified: false,
            notified_at: None,
            created_at: now,
            updated_at: now,
            is_removed: false,
            last_season: None,
            last_episode: None,
        }
    }

    /// Returns the record's current progression watermark
    pub fn watermark(&self) -> Watermark {
        Watermark {
            season: self.last_season,
            episode: self.last_episode,
        }
    }
}

/// Last season/episode found on a title's detail page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastSeasonInfo {
    pub last_season: Option<i32>,
    pub last_episode: Option<i32>,
}

/// The last confirmed (season, episode) pair of a tracked title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watermark {
    pub season: Option<i32>,
    pub episode: Option<i32>,
}

impl Watermark {
    /// Decides whether a detail lookup reports new content
    ///
    /// Absent values count as 0 on both sides and a fetched 0 is never
    /// accepted, so a title with a legitimate season or episode 0 can't
    /// advance past it. Accepted values are always greater than the stored
    /// pair in (season, episode) order.
    pub fn accepts(&self, fetched: &LastSeasonInfo) -> bool {
        let stored_season = self.season.unwrap_or(0);
        let stored_episode = self.episode.unwrap_or(0);
        let new_season = fetched.last_season.unwrap_or(0);
        let new_episode = fetched.last_episode.unwrap_or(0);

        if new_season == 0 || new_episode == 0 {
            return false;
        }

        if stored_season > new_season {
            return false;
        }

        !(new_season == stored_season && new_episode <= stored_episode)
    }
}
