//! # cadence-store
//!
//! SQLite persistence for the Cadence subsystem. Owns the outcome-store
//! tables (touches, score components, conversion ledger, clients), the
//! versioned pattern store with supersession history, and the orchestrator's
//! operational ledgers (health alerts, backfill checkpoints).

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StoreEngine;

use cadence_core::errors::{CadenceError, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};

/// Wrap a low-level SQLite failure message into the Cadence error type.
pub(crate) fn to_storage_err(message: String) -> CadenceError {
    CadenceError::Store(StoreError::SqliteError { message })
}

/// Fixed-width RFC 3339 rendering so TEXT comparisons order correctly.
/// Nanosecond precision keeps the round-trip lossless: a read-back
/// timestamp compares equal to the one that was written.
pub(crate) fn ts_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn ts_from_sql(raw: &str) -> Result<DateTime<Utc>, CadenceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_roundtrip_at_full_precision() {
        let ts = Utc.timestamp_opt(1_766_400_000, 987_654_321).unwrap();
        assert_eq!(ts_from_sql(&ts_to_sql(ts)).unwrap(), ts);
    }

    #[test]
    fn rendered_timestamps_are_fixed_width() {
        let whole_second = ts_to_sql(Utc.timestamp_opt(0, 0).unwrap());
        let sub_second = ts_to_sql(Utc.timestamp_opt(1_766_400_000, 987_654_321).unwrap());
        assert_eq!(whole_second.len(), sub_second.len());
    }
}
