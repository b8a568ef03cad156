//! Storage module for the movie catalog
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Catalog record lookup, insertion and watermark updates
//! - The transaction boundary wrapping a sync pass
//! - Pass history used by `--stats`

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCatalog;
pub use traits::{CatalogStore, PassCounts, StorageError, StorageResult};

use crate::NotifierError;

use std::path::Path;

/// Initializes or opens a catalog database
pub fn open_catalog(path: &Path) -> Result<SqliteCatalog, NotifierError> {
    Ok(SqliteCatalog::new(path)?)
}

/// Represents a sync pass in the database
#[derive(Debug, Clone)]
pub struct PassRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: PassStatus,
    pub counts: PassCounts,
    pub error_message: Option<String>,
}

/// Status of a sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl PassStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}
