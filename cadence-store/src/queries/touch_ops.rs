//! Touch ingest and scope-windowed reads.

use rusqlite::{params, params_from_iter, Connection, Row};

use cadence_core::errors::CadenceResult;
use cadence_core::model::{
    Channel, ContentFeatures, CtaType, Scope, SubjectLengthBucket, Touch, TrailingWindow,
};

use super::scope_clause;
use crate::{to_storage_err, ts_from_sql, ts_to_sql};

/// Insert a single touch. Ingest-side helper for the channel-engine
/// boundary and for tests.
pub fn insert_touch(conn: &Connection, touch: &Touch) -> CadenceResult<()> {
    conn.execute(
        "INSERT INTO touches (
            id, lead_id, client_id, channel, occurred_at,
            pain_point_mentioned, subject_length_bucket, has_question,
            cta_type, personalization_used, recipient_local_hour,
            recipient_local_weekday, converted_credit
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            touch.id,
            touch.lead_id,
            touch.client_id,
            touch.channel.as_str(),
            ts_to_sql(touch.occurred_at),
            touch.features.pain_point_mentioned.map(|b| b as i64),
            touch.features.subject_length_bucket.map(|b| b.as_str()),
            touch.features.has_question.map(|b| b as i64),
            touch.features.cta_type.map(|c| c.as_str()),
            touch.features.personalization_used.map(|b| b as i64),
            touch.features.recipient_local_hour.map(i64::from),
            touch.features.recipient_local_weekday.map(i64::from),
            touch.converted_credit as i64,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All touches for a scope within the window, ordered for determinism.
pub fn touches_for_scope(
    conn: &Connection,
    scope: &Scope,
    window: &TrailingWindow,
) -> CadenceResult<Vec<Touch>> {
    let (clause, mut sql_params) = scope_clause(scope, "client_id");
    let sql = format!(
        "SELECT id, lead_id, client_id, channel, occurred_at,
                pain_point_mentioned, subject_length_bucket, has_question,
                cta_type, personalization_used, recipient_local_hour,
                recipient_local_weekday, converted_credit
         FROM touches
         WHERE {clause} AND occurred_at >= ? AND occurred_at <= ?
         ORDER BY occurred_at, id"
    );
    sql_params.push(ts_to_sql(window.start()));
    sql_params.push(ts_to_sql(window.until));

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(sql_params.iter()), |row| {
            Ok(row_to_touch(row))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut touches = Vec::new();
    for row in rows {
        touches.push(row.map_err(|e| to_storage_err(e.to_string()))??);
    }
    Ok(touches)
}

fn row_to_touch(row: &Row<'_>) -> CadenceResult<Touch> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());

    let channel_raw: String = row.get(3).map_err(get_err)?;
    let channel = Channel::parse(&channel_raw)
        .ok_or_else(|| to_storage_err(format!("unknown channel {channel_raw:?}")))?;

    let occurred_raw: String = row.get(4).map_err(get_err)?;

    let subject_raw: Option<String> = row.get(6).map_err(get_err)?;
    let subject_length_bucket = match subject_raw {
        Some(s) => Some(
            SubjectLengthBucket::parse(&s)
                .ok_or_else(|| to_storage_err(format!("unknown subject bucket {s:?}")))?,
        ),
        None => None,
    };

    let cta_raw: Option<String> = row.get(8).map_err(get_err)?;
    let cta_type = match cta_raw {
        Some(s) => Some(
            CtaType::parse(&s).ok_or_else(|| to_storage_err(format!("unknown cta {s:?}")))?,
        ),
        None => None,
    };

    Ok(Touch {
        id: row.get(0).map_err(get_err)?,
        lead_id: row.get(1).map_err(get_err)?,
        client_id: row.get(2).map_err(get_err)?,
        channel,
        occurred_at: ts_from_sql(&occurred_raw)?,
        features: ContentFeatures {
            pain_point_mentioned: row
                .get::<_, Option<i64>>(5)
                .map_err(get_err)?
                .map(|v| v != 0),
            subject_length_bucket,
            has_question: row
                .get::<_, Option<i64>>(7)
                .map_err(get_err)?
                .map(|v| v != 0),
            cta_type,
            personalization_used: row
                .get::<_, Option<i64>>(9)
                .map_err(get_err)?
                .map(|v| v != 0),
            recipient_local_hour: row
                .get::<_, Option<i64>>(10)
                .map_err(get_err)?
                .map(|v| v as u8),
            recipient_local_weekday: row
                .get::<_, Option<i64>>(11)
                .map_err(get_err)?
                .map(|v| v as u8),
        },
        converted_credit: row.get::<_, i64>(12).map_err(get_err)? != 0,
    })
}
