//! Continue-page parser
//!
//! Walks the "continue watching" list and turns each row into a
//! `ScrapedItem`. The markup consumed here (row id prefix, info/title
//! containers, the login message box) is an unversioned contract with the
//! site and can break silently.

use crate::model::{MovieState, ScrapedItem};
use crate::source::classifier::{parse_episode_season, RowMarkup, StateClassifier};
use crate::NotifierError;
use scraper::{ElementRef, Html, Selector};

/// Rows of the continue list; each carries a `videosave-<id>` DOM id
pub const CONTINUE_ROWS: &str = r#"#videosaves-list > [id^="videosave"]"#;

/// Anchor inside the row's info block
pub const ROW_INFO_LINK: &str = r#"[class*="info"] > * > a"#;

/// Anchor inside the row's title block
pub const ROW_TITLE_LINK: &str = r#"[class*="title"] > a"#;

/// Message box shown instead of the list to anonymous visitors
pub const INFO_MESSAGE: &str = "div.b-info__message";

pub(crate) fn selector(css: &str) -> Result<Selector, NotifierError> {
    Selector::parse(css)
        .map_err(|e| NotifierError::HtmlParse(format!("invalid selector '{}': {:?}", css, e)))
}

/// Returns true if the page shows the "not logged in" message
pub fn is_not_logged_in(document: &Html, marker: &str) -> Result<bool, NotifierError> {
    let message = selector(INFO_MESSAGE)?;

    Ok(document
        .select(&message)
        .any(|node| node.text().collect::<String>().contains(marker)))
}

/// Extracts one item per continue-list row, in document order
///
/// Rows whose DOM id doesn't end in a numeric id are skipped and logged.
pub fn parse_continue_items(
    document: &Html,
    classifier: &dyn StateClassifier,
) -> Result<Vec<ScrapedItem>, NotifierError> {
    let rows = selector(CONTINUE_ROWS)?;
    let info_link = selector(ROW_INFO_LINK)?;
    let title_link = selector(ROW_TITLE_LINK)?;

    let mut items = Vec::new();

    for row in document.select(&rows) {
        let dom_id = row.value().id().unwrap_or_default();
        let Some(id) = parse_row_id(dom_id) else {
            tracing::warn!("Skipping continue row with unparseable id '{}'", dom_id);
            continue;
        };

        let info = row.select(&info_link).next();
        let title = row.select(&title_link).next();

        let info_text = info.map(element_text).unwrap_or_default();
        let title_text = title.map(element_text).unwrap_or_default();

        let state = classifier.classify(&RowMarkup {
            info_text: &info_text,
            row_classes: row.value().classes().collect(),
        });

        let (last_episode, last_season) = match state {
            MovieState::WatchNext => match parse_episode_season(&info_text) {
                Some((episode, season)) => (Some(episode), Some(season)),
                None => (None, None),
            },
            _ => (None, None),
        };

        let link_source = if state.links_via_info() { info } else { title };
        let link = link_source
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty());

        tracing::debug!("Row {} '{}' classified as {}", id, title_text, state);

        items.push(ScrapedItem {
            id,
            title: title_text,
            info: info_text,
            link,
            state,
            last_season,
            last_episode,
        });
    }

    Ok(items)
}

/// Parses the numeric id out of a `prefix-<id>` DOM id
///
/// Everything after the first dash must be the number, so `videosave-1-2`
/// is rejected and its row skipped instead of being read as id 1.
pub fn parse_row_id(dom_id: &str) -> Option<i64> {
    let (_, id) = dom_id.split_once('-')?;
    id.trim().parse().ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::classifier::MarkerClassifier;

    const PAGE: &str = r#"
        <html><body>
        <div id="videosaves-list">
            <div id="videosave-101" class="b-videosaves__list_item">
                <div class="td title"><a href="https://rezka.example/series/101-one.html">First Show</a></div>
                <div class="td info"><span><a href="https://rezka.example/series/101-one.html#t:1-s:1-e:5">Доступна 5 серия</a></span></div>
            </div>
            <div id="videosave-202" class="b-videosaves__list_item">
                <div class="td title"><a href="https://rezka.example/series/202-two.html">Second Show</a></div>
                <div class="td info"><span><a href="https://rezka.example/series/202-two.html#t:1-s:2-e:3">Следующая: 3 серия 2 сезона</a></span></div>
            </div>
            <div id="videosave-303" class="b-videosaves__list_item watched-row">
                <div class="td title"><a href="https://rezka.example/films/303-film.html">A Film</a></div>
                <div class="td info"><span><a href="https://rezka.example/films/303-film.html#t:1">Просмотрено</a></span></div>
            </div>
            <div id="videosave-404" class="b-videosaves__list_item">
                <div class="td title"><a href="https://rezka.example/films/404-other.html">Other</a></div>
            </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_all_states() {
        let document = Html::parse_document(PAGE);
        let items = parse_continue_items(&document, &MarkerClassifier::default()).unwrap();

        let states: Vec<_> = items.iter().map(|i| (i.id, i.state)).collect();
        assert_eq!(
            states,
            vec![
                (101, MovieState::NewSeriesAvailable),
                (202, MovieState::WatchNext),
                (303, MovieState::Watched),
                (404, MovieState::None),
            ]
        );
    }

    #[test]
    fn test_links_follow_state() {
        let document = Html::parse_document(PAGE);
        let items = parse_continue_items(&document, &MarkerClassifier::default()).unwrap();

        assert_eq!(
            items[0].link.as_deref(),
            Some("https://rezka.example/series/101-one.html#t:1-s:1-e:5")
        );
        assert_eq!(
            items[1].link.as_deref(),
            Some("https://rezka.example/series/202-two.html#t:1-s:2-e:3")
        );
        assert_eq!(
            items[2].link.as_deref(),
            Some("https://rezka.example/films/303-film.html")
        );
    }

    #[test]
    fn test_watch_next_episode_and_season() {
        let document = Html::parse_document(PAGE);
        let items = parse_continue_items(&document, &MarkerClassifier::default()).unwrap();

        assert_eq!(items[1].last_episode, Some(3));
        assert_eq!(items[1].last_season, Some(2));
        // Only WatchNext rows carry progress
        assert_eq!(items[0].last_episode, None);
        assert_eq!(items[0].last_season, None);
    }

    #[test]
    fn test_title_and_info_text() {
        let document = Html::parse_document(PAGE);
        let items = parse_continue_items(&document, &MarkerClassifier::default()).unwrap();

        assert_eq!(items[0].title, "First Show");
        assert_eq!(items[0].info, "Доступна 5 серия");
        assert_eq!(items[3].info, "");
    }

    #[test]
    fn test_unparseable_row_id_is_skipped() {
        let html = r#"
            <div id="videosaves-list">
                <div id="videosave-abc"><div class="title"><a href="/x">X</a></div></div>
                <div id="videosave-7"><div class="title"><a href="/y">Y</a></div></div>
            </div>
        "#;
        let document = Html::parse_document(html);
        let items = parse_continue_items(&document, &MarkerClassifier::default()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);
    }

    #[test]
    fn test_empty_page_yields_empty_list() {
        let document = Html::parse_document("<html><body></body></html>");
        let items = parse_continue_items(&document, &MarkerClassifier::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_injected_classifier() {
        let document = Html::parse_document(PAGE);
        fn everything_watched(_: &RowMarkup<'_>) -> MovieState {
            MovieState::Watched
        }
        let items = parse_continue_items(&document, &everything_watched).unwrap();

        assert!(items.iter().all(|i| i.state == MovieState::Watched));
        assert!(items.iter().all(|i| i.last_season.is_none()));
    }

    #[test]
    fn test_not_logged_in_marker() {
        let marker = "Раздел доступен для зарегистрированных пользователей";
        let html = format!(
            r#"<html><body><div class="b-info__message">{}</div></body></html>"#,
            marker
        );

        assert!(is_not_logged_in(&Html::parse_document(&html), marker).unwrap());
        assert!(!is_not_logged_in(&Html::parse_document(PAGE), marker).unwrap());
    }

    #[test]
    fn test_parse_row_id() {
        assert_eq!(parse_row_id("videosave-12345"), Some(12345));
        assert_eq!(parse_row_id("videosave"), None);
        assert_eq!(parse_row_id("videosave-"), None);
        assert_eq!(parse_row_id("videosave-1-2"), None);
    }
}
