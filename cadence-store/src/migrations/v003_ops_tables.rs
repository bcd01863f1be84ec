//! v003: pattern_health_log, backfill_checkpoints.

use rusqlite::Connection;

use cadence_core::errors::CadenceError;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> Result<(), CadenceError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pattern_health_log (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            scope_key            TEXT NOT NULL,
            pattern_type         TEXT NOT NULL,
            severity             TEXT NOT NULL,
            message              TEXT NOT NULL,
            observed_confidence  REAL NOT NULL,
            observed_sample_size INTEGER NOT NULL,
            created_at           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_health_scope
            ON pattern_health_log(scope_key, pattern_type);
        CREATE INDEX IF NOT EXISTS idx_health_created
            ON pattern_health_log(created_at);

        CREATE TABLE IF NOT EXISTS backfill_checkpoints (
            job_id       TEXT NOT NULL,
            scope_key    TEXT NOT NULL,
            completed_at TEXT NOT NULL,
            PRIMARY KEY (job_id, scope_key)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
