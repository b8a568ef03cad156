use serde::Deserialize;

/// Main configuration structure for Watchlist-Notifier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Where the continue page lives and how to identify to it
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the site; relative paths are joined onto it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the "continue watching" page
    #[serde(rename = "continue-path", default = "default_continue_path")]
    pub continue_path: String,

    /// Value of the `dle_user_id` session cookie
    #[serde(rename = "user-id")]
    pub user_id: String,

    /// Value of the `dle_password` session cookie
    #[serde(rename = "password-hash")]
    pub password_hash: String,

    /// Browser-like User-Agent header
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Text and markup markers used to classify continue-page rows
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerConfig {
    /// Info-line keywords meaning a new episode is available
    #[serde(rename = "new-episode", default = "default_new_episode_markers")]
    pub new_episode: Vec<String>,

    /// Info-line keywords meaning more episodes are queued
    #[serde(rename = "more-episodes", default = "default_more_episodes_markers")]
    pub more_episodes: Vec<String>,

    /// CSS class a fully watched row carries
    #[serde(rename = "watched-class", default = "default_watched_class")]
    pub watched_class: String,

    /// Message shown instead of the list when the session is not logged in
    #[serde(rename = "not-logged-in", default = "default_not_logged_in")]
    pub not_logged_in: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            new_episode: default_new_episode_markers(),
            more_episodes: default_more_episodes_markers(),
            watched_class: default_watched_class(),
            not_logged_in: default_not_logged_in(),
        }
    }
}

/// Sync pass and worker behavior
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Minutes between two passes
    #[serde(rename = "interval-minutes", default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Whether `WatchNext` rows are tracked for new seasons/episodes
    #[serde(rename = "track-progression", default = "default_true")]
    pub track_progression: bool,

    /// Retries of a failed detail lookup before the item is skipped
    #[serde(rename = "detail-retries", default = "default_detail_retries")]
    pub detail_retries: u32,

    /// Fixed delay before each detail lookup retry (milliseconds)
    #[serde(
        rename = "detail-retry-delay-ms",
        default = "default_detail_retry_delay_ms"
    )]
    pub detail_retry_delay_ms: u64,

    /// Consecutive failed passes tolerated before the worker stops
    #[serde(rename = "max-pass-retries", default = "default_max_pass_retries")]
    pub max_pass_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            track_progression: true,
            detail_retries: default_detail_retries(),
            detail_retry_delay_ms: default_detail_retry_delay_ms(),
            max_pass_retries: default_max_pass_retries(),
        }
    }
}

/// Catalog database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Notification delivery configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    /// Markdown file digests are appended to; log only when unset
    #[serde(rename = "outbox-path", default)]
    pub outbox_path: Option<String>,

    /// Name used to greet the recipient in digests
    #[serde(rename = "recipient-name", default)]
    pub recipient_name: Option<String>,
}

fn default_continue_path() -> String {
    "/continue/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "ru-RU,ru;q=0.8,en-US;q=0.6,en;q=0.4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_new_episode_markers() -> Vec<String> {
    vec!["доступен".to_string(), "доступна".to_string()]
}

fn default_more_episodes_markers() -> Vec<String> {
    vec!["следующая".to_string(), "далее".to_string()]
}

fn default_watched_class() -> String {
    "watched-row".to_string()
}

fn default_not_logged_in() -> String {
    "Раздел доступен для зарегистрированных пользователей".to_string()
}

fn default_interval_minutes() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_detail_retries() -> u32 {
    5
}

fn default_detail_retry_delay_ms() -> u64 {
    3000
}

fn default_max_pass_retries() -> u32 {
    5
}
