/// Viewing state definitions for titles on the continue page
///
/// This module defines the states a continue-page row can be classified into.
use std::fmt;

/// Represents the viewing state of a title as seen on the continue page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MovieState {
    /// No marker matched
    #[default]
    None,

    /// The site says a new episode of this title is out
    NewSeriesAvailable,

    /// The row carries the "watched" style marker
    Watched,

    /// More episodes are queued after the last watched one
    WatchNext,
}

impl MovieState {
    /// Returns true if a row in this state can create a catalog record
    pub fn is_trackable(&self) -> bool {
        matches!(self, Self::NewSeriesAvailable | Self::WatchNext)
    }

    /// Returns true if the row's link should come from its info anchor
    ///
    /// Trackable rows point at the episode to continue with; every other
    /// row links to the title page.
    pub fn links_via_info(&self) -> bool {
        self.is_trackable()
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NewSeriesAvailable => "new_series_available",
            Self::Watched => "watched",
            Self::WatchNext => "watch_next",
        }
    }

    /// Parses a state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "new_series_available" => Some(Self::NewSeriesAvailable),
            "watched" => Some(Self::Watched),
            "watch_next" => Some(Self::WatchNext),
            _ => None,
        }
    }

    /// Returns all possible states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::None,
            Self::NewSeriesAvailable,
            Self::Watched,
            Self::WatchNext,
        ]
    }
}

impl fmt::Display for MovieState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
