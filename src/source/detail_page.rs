//! Detail-page parser
//!
//! Reads the last season tab and the last episode of that season off a
//! title's detail page.

use crate::model::LastSeasonInfo;
use crate::source::continue_page::selector;
use crate::NotifierError;
use scraper::Html;

/// Season tabs of a series detail page
pub const SEASON_TABS: &str = "#simple-seasons-tabs > li";

/// Attribute holding a season tab's number
pub const SEASON_ATTR: &str = "data-tab_id";

/// Attribute holding an episode entry's number
pub const EPISODE_ATTR: &str = "data-episode_id";

/// Parses the last season and episode from a detail page
///
/// # Returns
///
/// * `{None, None}` - No season tab, or its number doesn't parse
/// * `{Some(season), None}` - Season found but no parseable episode in it
/// * `{Some(season), Some(episode)}` - Both found
pub fn parse_last_season_info(document: &Html) -> Result<LastSeasonInfo, NotifierError> {
    let tabs = selector(SEASON_TABS)?;

    let Some(season) = document
        .select(&tabs)
        .last()
        .and_then(|tab| tab.value().attr(SEASON_ATTR))
        .and_then(|value| value.trim().parse::<i32>().ok())
    else {
        return Ok(LastSeasonInfo::default());
    };

    let episodes = selector(&format!("#simple-episodes-list-{} > li", season))?;

    let episode = document
        .select(&episodes)
        .last()
        .and_then(|entry| entry.value().attr(EPISODE_ATTR))
        .and_then(|value| value.trim().parse::<i32>().ok());

    Ok(LastSeasonInfo {
        last_season: Some(season),
        last_episode: episode,
    })
}
