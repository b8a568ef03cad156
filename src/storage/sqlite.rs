//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CatalogStore trait.

use crate::model::{MovieRecord, MovieState};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CatalogStore, PassCounts, StorageError, StorageResult};
use crate::storage::{PassRecord, PassStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// How long a write waits for another connection's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const RECORD_COLUMNS: &str = "id, title, info, link, state, notified, notified_at, created_at,
     updated_at, is_removed, last_season, last_episode";

/// SQLite storage backend
pub struct SqliteCatalog {
    conn: Connection,
}

impl std::fmt::Debug for SqliteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCatalog").finish_non_exhaustive()
    }
}

impl SqliteCatalog {
    /// Creates a new SqliteCatalog instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCatalog)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Returns true while a pass transaction is open
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl CatalogStore for SqliteCatalog {
    // ===== Transactions =====

    fn begin(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        if self.conn.is_autocommit() {
            return Err(StorageError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // ===== Records =====

    fn find_existing_ids(&self, ids: &HashSet<i64>) -> StorageResult<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT id FROM movie_records WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let existing = stmt
            .query_map(params_from_iter(ids.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<HashSet<i64>, _>>()?;

        Ok(existing)
    }

    fn get_records(&self, ids: &HashSet<i64>) -> StorageResult<Vec<MovieRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM movie_records WHERE id IN ({}) ORDER BY id",
            RECORD_COLUMNS,
            placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt
            .query_map(params_from_iter(ids.iter()), row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn get_record(&self, id: i64) -> StorageResult<Option<MovieRecord>> {
        let sql = format!("SELECT {} FROM movie_records WHERE id = ?1", RECORD_COLUMNS);

        let record = self
            .conn
            .query_row(&sql, params![id], row_to_record)
            .optional()?;

        Ok(record)
    }

    fn insert_all(&mut self, records: &[MovieRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        // A savepoint keeps the batch all-or-nothing, inside or outside a pass
        let sp = self.conn.savepoint()?;
        {
            let mut stmt = sp.prepare(
                "INSERT INTO movie_records (id, title, info, link, state, notified, notified_at,
                 created_at, updated_at, is_removed, last_season, last_episode)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.title,
                    record.info,
                    record.link,
                    record.state.to_db_string(),
                    record.notified,
                    record.notified_at.map(|t| t.to_rfc3339()),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                    record.is_removed,
                    record.last_season,
                    record.last_episode,
                ])
                .map_err(|e| match e {
                    rusqlite::Error::SqliteFailure(ref failure, _)
                        if failure.code == ErrorCode::ConstraintViolation =>
                    {
                        StorageError::ConstraintViolation(format!(
                            "record {} already exists",
                            record.id
                        ))
                    }
                    other => StorageError::Sqlite(other),
                })?;
            }
        }
        sp.commit()?;

        Ok(())
    }

    fn update_watermark(&mut self, record: &MovieRecord) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE movie_records SET last_season = ?1, last_episode = ?2, updated_at = ?3
             WHERE id = ?4
               AND (COALESCE(last_season, 0) < ?1
                    OR (COALESCE(last_season, 0) = ?1 AND COALESCE(last_episode, 0) < ?2))",
            params![
                record.last_season,
                record.last_episode,
                record.updated_at.to_rfc3339(),
                record.id
            ],
        )?;

        if changed == 0 {
            if self.get_record(record.id)?.is_none() {
                return Err(StorageError::RecordNotFound(record.id));
            }
            return Err(StorageError::ConstraintViolation(format!(
                "watermark of record {} would not advance to ({:?}, {:?})",
                record.id, record.last_season, record.last_episode
            )));
        }

        Ok(())
    }

    fn mark_notified(&mut self, ids: &[i64], at: DateTime<Utc>) -> StorageResult<()> {
        let at = at.to_rfc3339();
        let mut stmt = self.conn.prepare(
            "UPDATE movie_records SET notified = 1, notified_at = ?1, updated_at = ?1
             WHERE id = ?2 AND notified = 0",
        )?;

        for id in ids {
            stmt.execute(params![at, id])?;
        }

        Ok(())
    }

    // ===== Pass History =====

    fn create_pass(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sync_passes (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, PassStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_pass(
        &mut self,
        pass_id: i64,
        status: PassStatus,
        counts: PassCounts,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE sync_passes SET finished_at = ?1, status = ?2, new_series = ?3,
             new_seasons = ?4, skipped_items = ?5, error_message = ?6 WHERE id = ?7",
            params![
                now,
                status.to_db_string(),
                counts.new_series as i64,
                counts.new_seasons as i64,
                counts.skipped_items as i64,
                error_message,
                pass_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::PassNotFound(pass_id));
        }

        Ok(())
    }

    fn get_latest_pass(&self) -> StorageResult<Option<PassRecord>> {
        let pass = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, new_series,
                 new_seasons, skipped_items, error_message
                 FROM sync_passes ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(PassRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        status: PassStatus::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(PassStatus::Failed),
                        counts: PassCounts {
                            new_series: row.get::<_, i64>(5)? as usize,
                            new_seasons: row.get::<_, i64>(6)? as usize,
                            skipped_items: row.get::<_, i64>(7)? as usize,
                        },
                        error_message: row.get(8)?,
                    })
                },
            )
            .optional()?;

        Ok(pass)
    }

    // ===== Statistics =====

    fn count_records(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM movie_records")
    }

    fn count_notified(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM movie_records WHERE notified = 1")
    }

    fn count_with_watermark(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM movie_records WHERE last_season IS NOT NULL")
    }

    fn count_by_state(&self, state: MovieState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM movie_records WHERE state = ?1",
            params![state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Builds `?, ?, ?` for an IN clause of `n` values
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn row_to_record(row: &Row) -> rusqlite::Result<MovieRecord> {
    let notified_at: Option<String> = row.get(6)?;

    Ok(MovieRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        info: row.get(2)?,
        link: row.get(3)?,
        state: MovieState::from_db_string(&row.get::<_, String>(4)?).unwrap_or(MovieState::None),
        notified: row.get(5)?,
        notified_at: notified_at
            .map(|s| parse_timestamp(6, &s))
            .transpose()?,
        created_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
        updated_at: parse_timestamp(8, &row.get::<_, String>(8)?)?,
        is_removed: row.get(9)?,
        last_season: row.get(10)?,
        last_episode: row.get(11)?,
    })
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
