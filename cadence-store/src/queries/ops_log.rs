//! Health-alert ledger and backfill checkpoints.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use cadence_core::errors::CadenceResult;
use cadence_core::model::Scope;
use cadence_core::traits::HealthAlert;

use crate::{to_storage_err, ts_to_sql};

pub fn record_health_alert(conn: &Connection, alert: &HealthAlert) -> CadenceResult<()> {
    conn.execute(
        "INSERT INTO pattern_health_log
            (scope_key, pattern_type, severity, message,
             observed_confidence, observed_sample_size, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            alert.scope.key(),
            alert.pattern_type.as_str(),
            alert.severity.as_str(),
            alert.message,
            alert.observed_confidence,
            alert.observed_sample_size as i64,
            ts_to_sql(alert.created_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn backfill_complete(conn: &Connection, job_id: &str, scope: &Scope) -> CadenceResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT completed_at FROM backfill_checkpoints
             WHERE job_id = ?1 AND scope_key = ?2",
            params![job_id, scope.key()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(found.is_some())
}

pub fn mark_backfill_complete(
    conn: &Connection,
    job_id: &str,
    scope: &Scope,
    completed_at: DateTime<Utc>,
) -> CadenceResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO backfill_checkpoints (job_id, scope_key, completed_at)
         VALUES (?1, ?2, ?3)",
        params![job_id, scope.key(), ts_to_sql(completed_at)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
