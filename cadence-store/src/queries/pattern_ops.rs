//! Versioned pattern writes and reads.
//!
//! A write is a transactional supersede-then-insert: the current active row
//! (if any) moves into the append-only history, then the new row lands on
//! the (scope_key, pattern_type) upsert key. Concurrent writers for the same
//! key resolve by `computed_at` — last writer wins, the loser is discarded
//! and logged, never merged.

use rusqlite::{params, Connection, OptionalExtension, Row};

use cadence_core::errors::{CadenceError, CadenceResult, StoreError};
use cadence_core::model::{Pattern, PatternPayload, PatternType, Scope};
use cadence_core::traits::WriteOutcome;

use crate::{to_storage_err, ts_from_sql, ts_to_sql};

pub fn write_pattern(conn: &Connection, pattern: &Pattern) -> CadenceResult<WriteOutcome> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("write_pattern begin: {e}")))?;

    let scope_key = pattern.scope.key();
    let type_str = pattern.pattern_type.as_str();

    if let Some(current) = get_active_inner(&tx, &scope_key, type_str)? {
        if current.computed_at > pattern.computed_at {
            tracing::warn!(
                scope = %scope_key,
                pattern_type = type_str,
                loser_computed_at = %pattern.computed_at,
                winner_computed_at = %current.computed_at,
                "write conflict: discarding stale pattern"
            );
            return Ok(WriteOutcome::DiscardedStale);
        }
        insert_history(&tx, &current, pattern.computed_at)?;
    }

    let payload_json =
        serde_json::to_string(&pattern.payload).map_err(|e| to_storage_err(e.to_string()))?;
    tx.execute(
        "INSERT OR REPLACE INTO patterns_active
            (scope_key, pattern_type, payload, sample_size, confidence, computed_at, valid_until)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            scope_key,
            type_str,
            payload_json,
            pattern.sample_size as i64,
            pattern.confidence,
            ts_to_sql(pattern.computed_at),
            ts_to_sql(pattern.valid_until),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.commit()
        .map_err(|e| to_storage_err(format!("write_pattern commit: {e}")))?;
    Ok(WriteOutcome::Applied)
}

fn insert_history(
    conn: &Connection,
    superseded: &Pattern,
    superseded_at: chrono::DateTime<chrono::Utc>,
) -> CadenceResult<()> {
    let payload_json =
        serde_json::to_string(&superseded.payload).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        "INSERT INTO pattern_history
            (scope_key, pattern_type, payload, sample_size, confidence,
             computed_at, valid_until, superseded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            superseded.scope.key(),
            superseded.pattern_type.as_str(),
            payload_json,
            superseded.sample_size as i64,
            superseded.confidence,
            ts_to_sql(superseded.computed_at),
            ts_to_sql(superseded.valid_until),
            ts_to_sql(superseded_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_active(
    conn: &Connection,
    scope: &Scope,
    pattern_type: PatternType,
) -> CadenceResult<Option<Pattern>> {
    get_active_inner(conn, &scope.key(), pattern_type.as_str())
}

fn get_active_inner(
    conn: &Connection,
    scope_key: &str,
    type_str: &str,
) -> CadenceResult<Option<Pattern>> {
    let result = conn
        .query_row(
            "SELECT scope_key, pattern_type, payload, sample_size, confidence,
                    computed_at, valid_until
             FROM patterns_active
             WHERE scope_key = ?1 AND pattern_type = ?2",
            params![scope_key, type_str],
            |row| Ok(row_to_pattern(row)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(pattern) => Ok(Some(pattern?)),
        None => Ok(None),
    }
}

pub fn history(
    conn: &Connection,
    scope: &Scope,
    pattern_type: PatternType,
) -> CadenceResult<Vec<Pattern>> {
    let mut stmt = conn
        .prepare(
            "SELECT scope_key, pattern_type, payload, sample_size, confidence,
                    computed_at, valid_until
             FROM pattern_history
             WHERE scope_key = ?1 AND pattern_type = ?2
             ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![scope.key(), pattern_type.as_str()], |row| {
            Ok(row_to_pattern(row))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut patterns = Vec::new();
    for row in rows {
        patterns.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(patterns)
}

pub fn list_active(conn: &Connection) -> CadenceResult<Vec<Pattern>> {
    let mut stmt = conn
        .prepare(
            "SELECT scope_key, pattern_type, payload, sample_size, confidence,
                    computed_at, valid_until
             FROM patterns_active
             ORDER BY scope_key, pattern_type",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok(row_to_pattern(row)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut patterns = Vec::new();
    for row in rows {
        patterns.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(patterns)
}

fn row_to_pattern(row: &Row<'_>) -> CadenceResult<Pattern> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());

    let scope_key: String = row.get(0).map_err(get_err)?;
    let scope = Scope::from_key(&scope_key).ok_or_else(|| {
        CadenceError::Store(StoreError::UnknownScopeKey {
            key: scope_key.clone(),
        })
    })?;

    let type_raw: String = row.get(1).map_err(get_err)?;
    let pattern_type = PatternType::parse(&type_raw)
        .ok_or_else(|| to_storage_err(format!("unknown pattern type {type_raw:?}")))?;

    let payload_json: String = row.get(2).map_err(get_err)?;
    let payload: PatternPayload =
        serde_json::from_str(&payload_json).map_err(|e| to_storage_err(e.to_string()))?;

    let computed_raw: String = row.get(5).map_err(get_err)?;
    let valid_raw: String = row.get(6).map_err(get_err)?;

    Ok(Pattern {
        scope,
        pattern_type,
        payload,
        sample_size: row.get::<_, i64>(3).map_err(get_err)? as u64,
        confidence: row.get(4).map_err(get_err)?,
        computed_at: ts_from_sql(&computed_raw)?,
        valid_until: ts_from_sql(&valid_raw)?,
    })
}
