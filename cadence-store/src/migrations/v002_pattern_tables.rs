//! v002: patterns_active, pattern_history.
//!
//! The composite primary key on patterns_active enforces the at-most-one
//! active row invariant per (scope, pattern_type). History is append-only.

use rusqlite::Connection;

use cadence_core::errors::CadenceError;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> Result<(), CadenceError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS patterns_active (
            scope_key    TEXT NOT NULL,
            pattern_type TEXT NOT NULL,
            payload      TEXT NOT NULL,
            sample_size  INTEGER NOT NULL,
            confidence   REAL NOT NULL,
            computed_at  TEXT NOT NULL,
            valid_until  TEXT NOT NULL,
            PRIMARY KEY (scope_key, pattern_type)
        );

        CREATE TABLE IF NOT EXISTS pattern_history (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            scope_key     TEXT NOT NULL,
            pattern_type  TEXT NOT NULL,
            payload       TEXT NOT NULL,
            sample_size   INTEGER NOT NULL,
            confidence    REAL NOT NULL,
            computed_at   TEXT NOT NULL,
            valid_until   TEXT NOT NULL,
            superseded_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_history_scope
            ON pattern_history(scope_key, pattern_type);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
