//! Score components, conversion ledger, and client directory reads.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use cadence_core::errors::{CadenceError, CadenceResult, StoreError};
use cadence_core::model::{
    AttributionMethod, ConversionEvent, LeadOutcome, Scope, ScoreComponents, TrailingWindow,
};

use super::scope_clause;
use crate::{to_storage_err, ts_from_sql, ts_to_sql};

/// Upsert a client's directory entry.
pub fn upsert_client(
    conn: &Connection,
    client_id: &str,
    industry_segment: Option<&str>,
) -> CadenceResult<()> {
    conn.execute(
        "INSERT INTO clients (client_id, industry_segment) VALUES (?1, ?2)
         ON CONFLICT(client_id) DO UPDATE SET industry_segment = excluded.industry_segment",
        params![client_id, industry_segment],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn industry_segment(conn: &Connection, client_id: &str) -> CadenceResult<Option<String>> {
    conn.query_row(
        "SELECT industry_segment FROM clients WHERE client_id = ?1",
        params![client_id],
        |row| row.get::<_, Option<String>>(0),
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
    .map(|found| found.flatten())
}

/// Insert a lead's score components (ingest-side helper).
pub fn insert_score_components(
    conn: &Connection,
    lead_id: &str,
    client_id: &str,
    components: &ScoreComponents,
) -> CadenceResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO score_components
            (lead_id, client_id, data_quality, authority, company_fit, timing, risk)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            lead_id,
            client_id,
            components.data_quality,
            components.authority,
            components.company_fit,
            components.timing,
            components.risk,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Record a conversion credit. Enforces single attribution: a second event
/// for the same lead is refused, and `converted_credit` is never unset.
pub fn record_conversion(conn: &Connection, event: &ConversionEvent) -> CadenceResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("record_conversion begin: {e}")))?;

    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM conversion_events WHERE lead_id = ?1",
            params![event.lead_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    if existing.is_some() {
        return Err(CadenceError::Store(StoreError::ConversionAlreadyCredited {
            lead_id: event.lead_id.clone(),
        }));
    }

    tx.execute(
        "INSERT INTO conversion_events (lead_id, touch_id, method, credited_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            event.lead_id,
            event.touch_id,
            event.method.as_str(),
            ts_to_sql(event.credited_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.execute(
        "UPDATE touches SET converted_credit = 1 WHERE id = ?1 AND lead_id = ?2",
        params![event.touch_id, event.lead_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.commit()
        .map_err(|e| to_storage_err(format!("record_conversion commit: {e}")))?;
    Ok(())
}

/// Per-lead (components, outcome) pairs for leads touched within the window.
pub fn lead_outcomes_for_scope(
    conn: &Connection,
    scope: &Scope,
    window: &TrailingWindow,
) -> CadenceResult<Vec<LeadOutcome>> {
    let (clause, mut sql_params) = scope_clause(scope, "sc.client_id");
    let sql = format!(
        "SELECT sc.lead_id, sc.data_quality, sc.authority, sc.company_fit,
                sc.timing, sc.risk,
                EXISTS(SELECT 1 FROM conversion_events ce WHERE ce.lead_id = sc.lead_id)
         FROM score_components sc
         WHERE {clause}
           AND EXISTS(SELECT 1 FROM touches t
                      WHERE t.lead_id = sc.lead_id
                        AND t.occurred_at >= ? AND t.occurred_at <= ?)
         ORDER BY sc.lead_id"
    );
    sql_params.push(ts_to_sql(window.start()));
    sql_params.push(ts_to_sql(window.until));

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(sql_params.iter()), |row| {
            Ok(LeadOutcome {
                lead_id: row.get(0)?,
                components: ScoreComponents {
                    data_quality: row.get(1)?,
                    authority: row.get(2)?,
                    company_fit: row.get(3)?,
                    timing: row.get(4)?,
                    risk: row.get(5)?,
                },
                converted: row.get::<_, i64>(6)? != 0,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut outcomes = Vec::new();
    for row in rows {
        outcomes.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(outcomes)
}

/// Conversion ledger entries for a scope within the window, by the credited
/// touch's client.
pub fn conversion_events_for_scope(
    conn: &Connection,
    scope: &Scope,
    window: &TrailingWindow,
) -> CadenceResult<Vec<ConversionEvent>> {
    let (clause, mut sql_params) = scope_clause(scope, "t.client_id");
    let sql = format!(
        "SELECT ce.lead_id, ce.touch_id, ce.method, ce.credited_at
         FROM conversion_events ce
         JOIN touches t ON t.id = ce.touch_id
         WHERE {clause} AND ce.credited_at >= ? AND ce.credited_at <= ?
         ORDER BY ce.credited_at, ce.lead_id"
    );
    sql_params.push(ts_to_sql(window.start()));
    sql_params.push(ts_to_sql(window.until));

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(sql_params.iter()), |row| {
            let method_raw: String = row.get(2)?;
            let credited_raw: String = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                method_raw,
                credited_raw,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut events = Vec::new();
    for row in rows {
        let (lead_id, touch_id, method_raw, credited_raw) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let method = AttributionMethod::parse(&method_raw)
            .ok_or_else(|| to_storage_err(format!("unknown attribution {method_raw:?}")))?;
        events.push(ConversionEvent {
            lead_id,
            touch_id,
            method,
            credited_at: ts_from_sql(&credited_raw)?,
        });
    }
    Ok(events)
}

pub fn list_client_ids(conn: &Connection) -> CadenceResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT client_id FROM touches ORDER BY client_id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn list_industry_segments(conn: &Connection) -> CadenceResult<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT industry_segment FROM clients
             WHERE industry_segment IS NOT NULL
             ORDER BY industry_segment",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
