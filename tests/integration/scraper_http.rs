//! Integration tests for the continue-page scraper
//!
//! These tests use wiremock to stand in for the site and exercise the
//! scraper through real HTTP requests.

use watchlist_notifier::config::{
    Config, MarkerConfig, NotifyConfig, SourceConfig, StorageConfig, SyncConfig,
};
use watchlist_notifier::source::{ContinueScraper, ContinueSource};
use watchlist_notifier::{LastSeasonInfo, MovieState, NotifierError};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTINUE_PAGE_GZ: &[u8] = include_bytes!("../fixtures/continue_page.html.gz");

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    Config {
        source: SourceConfig {
            base_url: base_url.to_string(),
            continue_path: "/continue/".to_string(),
            user_id: "12345".to_string(),
            password_hash: "0a1b2c3d".to_string(),
            user_agent: "Mozilla/5.0 (TestBot)".to_string(),
            accept_language: "ru-RU,ru;q=0.8".to_string(),
            timeout_secs: 5,
        },
        markers: MarkerConfig::default(),
        sync: SyncConfig::default(),
        storage: StorageConfig {
            database_path: ":memory:".to_string(),
        },
        notify: NotifyConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_gzipped_continue_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/continue/"))
        .and(header_exists("cookie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(CONTINUE_PAGE_GZ)
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("content-encoding", "gzip"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();
    let items = scraper.list_continue_items().await.unwrap();

    let summary: Vec<_> = items.iter().map(|i| (i.id, i.state)).collect();
    assert_eq!(
        summary,
        vec![
            (101, MovieState::NewSeriesAvailable),
            (202, MovieState::WatchNext),
            (303, MovieState::Watched),
            (404, MovieState::None),
        ]
    );

    assert_eq!(items[0].title, "First Show");
    assert_eq!(items[0].info, "Доступна 5 серия");
    assert_eq!(
        items[0].link.as_deref(),
        Some("/series/101-first-show.html#t:1-s:1-e:5")
    );

    assert_eq!(items[1].last_episode, Some(3));
    assert_eq!(items[1].last_season, Some(2));

    // Watched rows link to the title, not the info anchor
    assert_eq!(items[2].link.as_deref(), Some("/films/303-a-film.html"));
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/continue/"))
        .and(header("user-agent", "Mozilla/5.0 (TestBot)"))
        .and(header("upgrade-insecure-requests", "1"))
        .and(header_exists("accept-language"))
        .and(header_exists("cookie"))
        .respond_with(html(r#"<div id="videosaves-list"></div>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();
    let items = scraper.list_continue_items().await.unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_not_logged_in_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/continue/"))
        .respond_with(html(
            r#"<html><body>
                <div class="b-info__message">Раздел доступен для зарегистрированных пользователей</div>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = scraper.list_continue_items().await;

    assert!(matches!(result, Err(NotifierError::Auth(_))));
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/continue/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();

    match scraper.list_continue_items().await {
        Err(NotifierError::Fetch { url, status, reason }) => {
            assert_eq!(status, 500);
            assert_eq!(reason, "Internal Server Error");
            assert!(url.ends_with("/continue/"));
        }
        other => panic!("expected a fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_last_season_info_from_detail_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/series/202-second-show.html"))
        .respond_with(html(
            r#"<html><body>
                <ul id="simple-seasons-tabs">
                    <li data-tab_id="1">Сезон 1</li>
                    <li data-tab_id="2">Сезон 2</li>
                </ul>
                <ul id="simple-episodes-list-1">
                    <li data-season_id="1" data-episode_id="1">Серия 1</li>
                    <li data-season_id="1" data-episode_id="2">Серия 2</li>
                </ul>
                <ul id="simple-episodes-list-2">
                    <li data-season_id="2" data-episode_id="1">Серия 1</li>
                    <li data-season_id="2" data-episode_id="2">Серия 2</li>
                    <li data-season_id="2" data-episode_id="3">Серия 3</li>
                </ul>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();

    // Relative links from the continue page resolve against the base URL
    let info = scraper
        .last_season_info("/series/202-second-show.html#t:1-s:2-e:3")
        .await
        .unwrap();
    assert_eq!(
        info,
        LastSeasonInfo {
            last_season: Some(2),
            last_episode: Some(3),
        }
    );

    // Absolute links are used as they are
    let absolute = format!("{}/series/202-second-show.html", mock_server.uri());
    let info = scraper.last_season_info(&absolute).await.unwrap();
    assert_eq!(info.last_season, Some(2));
}

#[tokio::test]
async fn test_detail_page_without_seasons() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/films/303-a-film.html"))
        .respond_with(html("<html><body><h1>A Film</h1></body></html>"))
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();
    let info = scraper.last_season_info("/films/303-a-film.html").await.unwrap();

    assert_eq!(info, LastSeasonInfo::default());
}

#[tokio::test]
async fn test_missing_detail_page_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/series/gone.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let scraper = ContinueScraper::new(&create_test_config(&mock_server.uri())).unwrap();
    let result = scraper.last_season_info("/series/gone.html").await;

    assert!(matches!(
        result,
        Err(NotifierError::Fetch { status: 404, .. })
    ));
}
