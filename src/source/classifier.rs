//! Heuristic viewing-state classification
//!
//! Classification only looks at text and class markers the site is known to
//! render; it is a best-effort heuristic and may need new keywords when the
//! site changes its wording.

use crate::config::MarkerConfig;
use crate::model::MovieState;

/// What a classifier gets to see of one continue-page row
#[derive(Debug, Clone, Default)]
pub struct RowMarkup<'a> {
    /// Text of the row's info anchor
    pub info_text: &'a str,

    /// CSS classes on the row element
    pub row_classes: Vec<&'a str>,
}

/// Strategy deciding a row's `MovieState`
pub trait StateClassifier: Send + Sync {
    fn classify(&self, row: &RowMarkup<'_>) -> MovieState;
}

impl<F> StateClassifier for F
where
    F: Fn(&RowMarkup<'_>) -> MovieState + Send + Sync,
{
    fn classify(&self, row: &RowMarkup<'_>) -> MovieState {
        self(row)
    }
}

/// Keyword and class marker classifier
///
/// Checks, in order: a "new episode" keyword in the info text, a "more
/// episodes" keyword in the info text, then the watched row class.
/// Keyword matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    new_episode: Vec<String>,
    more_episodes: Vec<String>,
    watched_class: String,
}

impl MarkerClassifier {
    pub fn new(markers: &MarkerConfig) -> Self {
        Self {
            new_episode: lowercase_keywords(&markers.new_episode),
            more_episodes: lowercase_keywords(&markers.more_episodes),
            watched_class: markers.watched_class.clone(),
        }
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::new(&MarkerConfig::default())
    }
}

impl StateClassifier for MarkerClassifier {
    fn classify(&self, row: &RowMarkup<'_>) -> MovieState {
        let info = row.info_text.to_lowercase();

        if contains_any(&info, &self.new_episode) {
            MovieState::NewSeriesAvailable
        } else if contains_any(&info, &self.more_episodes) {
            MovieState::WatchNext
        } else if row.row_classes.iter().any(|c| *c == self.watched_class) {
            MovieState::Watched
        } else {
            MovieState::None
        }
    }
}

fn lowercase_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Extracts (episode, season) from an info line
///
/// The line is expected to carry exactly two free-standing integers, episode
/// first; anything else yields None.
pub fn parse_episode_season(info: &str) -> Option<(i32, i32)> {
    let numbers: Vec<i32> = info
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<i32>())
        .collect::<Result<_, _>>()
        .ok()?;

    match numbers.as_slice() {
        [episode, season] => Some((*episode, *season)),
        _ => None,
    }
}
