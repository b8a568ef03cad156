//! Configuration module for Watchlist-Notifier
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use watchlist_notifier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("notifier.toml")).unwrap();
//! println!("Syncing every {} minutes", config.sync.interval_minutes);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, MarkerConfig, NotifyConfig, SourceConfig, StorageConfig, SyncConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
