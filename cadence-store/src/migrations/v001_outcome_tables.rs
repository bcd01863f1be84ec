//! v001: touches, score_components, conversion_events, clients.
//!
//! These are the outcome-store boundary tables. The content-feature columns
//! are the fixed vocabulary the detectors expect; all nullable, since a
//! missing field means "excluded from that dimension's analysis".

use rusqlite::Connection;

use cadence_core::errors::CadenceError;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> Result<(), CadenceError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS touches (
            id                      TEXT PRIMARY KEY,
            lead_id                 TEXT NOT NULL,
            client_id               TEXT NOT NULL,
            channel                 TEXT NOT NULL,
            occurred_at             TEXT NOT NULL,
            pain_point_mentioned    INTEGER,
            subject_length_bucket   TEXT,
            has_question            INTEGER,
            cta_type                TEXT,
            personalization_used    INTEGER,
            recipient_local_hour    INTEGER,
            recipient_local_weekday INTEGER,
            converted_credit        INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_touches_client ON touches(client_id);
        CREATE INDEX IF NOT EXISTS idx_touches_lead ON touches(lead_id);
        CREATE INDEX IF NOT EXISTS idx_touches_occurred ON touches(occurred_at);

        CREATE TABLE IF NOT EXISTS score_components (
            lead_id     TEXT PRIMARY KEY,
            client_id   TEXT NOT NULL,
            data_quality REAL NOT NULL,
            authority    REAL NOT NULL,
            company_fit  REAL NOT NULL,
            timing       REAL NOT NULL,
            risk         REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_scores_client ON score_components(client_id);

        CREATE TABLE IF NOT EXISTS conversion_events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            lead_id     TEXT NOT NULL UNIQUE,
            touch_id    TEXT NOT NULL,
            method      TEXT NOT NULL,
            credited_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_conversions_credited ON conversion_events(credited_at);

        CREATE TABLE IF NOT EXISTS clients (
            client_id        TEXT PRIMARY KEY,
            industry_segment TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_clients_segment ON clients(industry_segment);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
