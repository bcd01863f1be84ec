//! Versioned schema migrations, applied in order on startup.

mod v001_outcome_tables;
mod v002_pattern_tables;
mod v003_ops_tables;

use rusqlite::Connection;

use cadence_core::errors::{CadenceError, StoreError};

use crate::to_storage_err;

/// All migrations, in order. `user_version` tracks the last applied one.
const MIGRATIONS: &[(u32, fn(&Connection) -> Result<(), CadenceError>)] = &[
    (1, v001_outcome_tables::migrate),
    (2, v002_pattern_tables::migrate),
    (3, v003_ops_tables::migrate),
];

/// Run every migration newer than the database's current version.
pub fn run_migrations(conn: &Connection) -> Result<(), CadenceError> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            CadenceError::Store(StoreError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }
    Ok(())
}
