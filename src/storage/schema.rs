//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the catalog database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Catalog of tracked titles, keyed by the site's own id
CREATE TABLE IF NOT EXISTS movie_records (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    info TEXT,
    link TEXT,
    state TEXT NOT NULL,
    notified INTEGER NOT NULL DEFAULT 0,
    notified_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    is_removed INTEGER NOT NULL DEFAULT 0,
    last_season INTEGER,
    last_episode INTEGER
);

CREATE INDEX IF NOT EXISTS idx_movie_records_state ON movie_records(state);
CREATE INDEX IF NOT EXISTS idx_movie_records_notified ON movie_records(notified);

-- One row per sync pass, written outside the pass transaction
CREATE TABLE IF NOT EXISTS sync_passes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    new_series INTEGER NOT NULL DEFAULT 0,
    new_seasons INTEGER NOT NULL DEFAULT 0,
    skipped_items INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
