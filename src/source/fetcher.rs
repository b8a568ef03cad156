//! HTTP page fetcher
//!
//! This module handles all HTTP requests to the site, including:
//! - Building the HTTP client with the session cookies and browser headers
//! - Resolving relative paths against the configured base URL
//! - Turning non-success statuses into typed fetch errors
//! - Parsing the body into a queryable document

use crate::config::SourceConfig;
use crate::{ConfigError, NotifierError};
use reqwest::cookie::Jar;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, UPGRADE_INSECURE_REQUESTS,
};
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Builds an HTTP client with the session identity attached
///
/// The `dle_user_id`/`dle_password` cookie pair is stored in a jar scoped to
/// the base URL. Gzip and brotli bodies are inflated by the client whenever
/// the response advertises them in `Content-Encoding`.
///
/// # Example
///
/// ```no_run
/// use watchlist_notifier::config::load_config;
/// use watchlist_notifier::source::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("notifier.toml")).unwrap();
/// let client = build_http_client(&config.source).unwrap();
/// ```
pub fn build_http_client(config: &SourceConfig) -> Result<Client, NotifierError> {
    let base_url = Url::parse(&config.base_url)?;

    let jar = Jar::default();
    jar.add_cookie_str(&format!("dle_user_id={}", config.user_id), &base_url);
    jar.add_cookie_str(&format!("dle_password={}", config.password_hash), &base_url);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).map_err(|e| {
            ConfigError::Validation(format!("accept-language is not a valid header: {}", e))
        })?,
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_provider(Arc::new(jar))
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches pages of one site through a pre-configured client
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: Url,
}

impl PageFetcher {
    /// Creates a fetcher with a client built from the source config
    pub fn new(config: &SourceConfig) -> Result<Self, NotifierError> {
        let client = build_http_client(config)?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Resolves a relative path or absolute URL against the base URL
    pub fn resolve(&self, path: &str) -> Result<Url, NotifierError> {
        Ok(self.base_url.join(path.trim())?)
    }

    /// Fetches a page and returns its decoded body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Body text, already inflated if it was compressed
    /// * `Err(NotifierError::Fetch)` - The server answered with a non-success status
    /// * `Err(NotifierError::Http)` - The request itself failed
    pub async fn fetch_text(&self, path: &str) -> Result<String, NotifierError> {
        let url = self.resolve(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status").to_string();
            tracing::error!(
                "Request to {} failed. Status code: {}. Reason: {}",
                url,
                status.as_u16(),
                reason
            );
            return Err(NotifierError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
                reason,
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches a page and parses it into an HTML document
    pub async fn fetch(&self, path: &str) -> Result<Html, NotifierError> {
        let body = self.fetch_text(path).await?;
        Ok(Html::parse_document(&body))
    }
}
