//! Catalog store trait and error types

use crate::model::{MovieRecord, MovieState};
use crate::storage::{PassRecord, PassStatus};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Pass not found: {0}")]
    PassNotFound(i64),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("No transaction in progress")]
    NoTransaction,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted catalog of `MovieRecord`s plus the pass history
///
/// The sync engine owns its store, so one pass at a time holds the
/// transaction.
pub trait CatalogStore: Send {
    // ===== Transactions =====

    /// Starts the transaction that wraps a whole pass
    fn begin(&mut self) -> StorageResult<()>;

    /// Commits the open transaction
    fn commit(&mut self) -> StorageResult<()>;

    /// Rolls the open transaction back; a no-op when none is open
    fn rollback(&mut self) -> StorageResult<()>;

    // ===== Records =====

    /// Returns the subset of `ids` that already have a record
    fn find_existing_ids(&self, ids: &HashSet<i64>) -> StorageResult<HashSet<i64>>;

    /// Loads the records for `ids`, skipping unknown ids
    fn get_records(&self, ids: &HashSet<i64>) -> StorageResult<Vec<MovieRecord>>;

    /// Loads a single record
    fn get_record(&self, id: i64) -> StorageResult<Option<MovieRecord>>;

    /// Inserts new records
    ///
    /// Fails with a constraint violation if any id already exists; records are
    /// never re-created.
    fn insert_all(&mut self, records: &[MovieRecord]) -> StorageResult<()>;

    /// Persists a record's (season, episode) watermark
    ///
    /// Refuses to move the watermark backwards or keep it in place.
    fn update_watermark(&mut self, record: &MovieRecord) -> StorageResult<()>;

    /// Flags records as notified; already notified records keep their
    /// original `notified_at`
    fn mark_notified(&mut self, ids: &[i64], at: DateTime<Utc>) -> StorageResult<()>;

    // ===== Pass History =====

    /// Records the start of a pass and returns its id
    fn create_pass(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records how a pass ended
    fn finish_pass(
        &mut self,
        pass_id: i64,
        status: PassStatus,
        counts: PassCounts,
        error_message: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets the most recent pass
    fn get_latest_pass(&self) -> StorageResult<Option<PassRecord>>;

    // ===== Statistics =====

    /// Gets total record count
    fn count_records(&self) -> StorageResult<u64>;

    /// Counts records whose notification went out
    fn count_notified(&self) -> StorageResult<u64>;

    /// Counts records with a progression watermark
    fn count_with_watermark(&self) -> StorageResult<u64>;

    /// Counts records by their snapshot state
    fn count_by_state(&self, state: MovieState) -> StorageResult<u64>;
}

/// Per-pass counters stored with the pass history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub new_series: usize,
    pub new_seasons: usize,
    pub skipped_items: usize,
}
