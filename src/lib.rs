//! Watchlist-Notifier: a "continue watching" change notifier
//!
//! This crate scrapes a streaming site's "continue watching" page, classifies
//! each listed title, reconciles the snapshot against a SQLite catalog and
//! sends a notification when new series or new episodes show up.

pub mod config;
pub mod model;
pub mod notify;
pub mod output;
pub mod source;
pub mod storage;
pub mod sync;
pub mod testing;

use thiserror::Error;

/// Main error type for Watchlist-Notifier operations
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request to {url} failed with status {status}: {reason}")]
    Fetch {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Session is not logged in: {0}")]
    Auth(String),

    #[error("Detail lookup failed for {link}: {message}")]
    DetailFetch { link: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Sync pass cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifierError {
    /// Returns true when the stored session cookie is stale.
    ///
    /// Retrying cannot fix this, so the worker stops on it right away.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Watchlist-Notifier operations
pub type Result<T> = std::result::Result<T, NotifierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{LastSeasonInfo, MovieRecord, MovieState, ScrapedItem};
pub use notify::Notifier;
pub use source::{ContinueScraper, ContinueSource};
pub use storage::{CatalogStore, SqliteCatalog};
pub use sync::{PassOutcome, SyncEngine, Worker};
