//! The storage engine: one writer, a read pool, and the trait surface the
//! rest of the subsystem consumes.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use cadence_core::errors::{CadenceError, CadenceResult, StoreError};
use cadence_core::model::{
    ConversionEvent, LeadOutcome, Pattern, PatternPayload, PatternType, Scope, ScoreComponents,
    Touch, TrailingWindow,
};
use cadence_core::traits::{
    HealthAlert, IClientDirectory, IOpsStore, IOutcomeReader, IPatternStore, WriteOutcome,
};
use cadence_core::WatermarkRegistry;

use crate::migrations::run_migrations;
use crate::pool::pragmas::verify_wal_mode;
use crate::pool::ConnectionPool;
use crate::queries::{ops_log, outcome_ops, pattern_ops, touch_ops};

/// SQLite-backed implementation of every storage trait in the subsystem.
///
/// Writes serialize through the single write connection; reads go through
/// the read pool in file-backed mode. Every applied pattern write bumps the
/// shared watermark registry so resolver caches revalidate without polling.
pub struct StoreEngine {
    pool: ConnectionPool,
    use_read_pool: bool,
    watermarks: Arc<WatermarkRegistry>,
}

impl StoreEngine {
    /// Open (or create) the database at `path` and run pending migrations.
    pub fn open(path: &Path, read_pool_size: usize) -> CadenceResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self {
            pool,
            use_read_pool: true,
            watermarks: Arc::new(WatermarkRegistry::new()),
        };
        engine.initialize()?;
        engine.pool.writer.with_conn_sync(|conn| {
            if !verify_wal_mode(conn)? {
                tracing::warn!("journal_mode is not WAL; readers may block on the writer");
            }
            Ok(())
        })?;
        Ok(engine)
    }

    /// In-memory engine for tests. Reads route through the writer because
    /// in-memory read connections are isolated databases.
    pub fn open_in_memory() -> CadenceResult<Self> {
        let pool = ConnectionPool::open_in_memory(1)?;
        let engine = Self {
            pool,
            use_read_pool: false,
            watermarks: Arc::new(WatermarkRegistry::new()),
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> CadenceResult<()> {
        self.pool.writer.with_conn_sync(run_migrations)
    }

    /// The shared watermark registry, for wiring into the resolver.
    pub fn watermarks(&self) -> Arc<WatermarkRegistry> {
        Arc::clone(&self.watermarks)
    }

    fn with_reader<F, T>(&self, f: F) -> CadenceResult<T>
    where
        F: FnOnce(&Connection) -> CadenceResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }

    // Ingest-side helpers. In production these rows arrive from the channel
    // engines and the conversion marker; tests seed through the same path.

    pub fn insert_touch(&self, touch: &Touch) -> CadenceResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| touch_ops::insert_touch(conn, touch))
    }

    pub fn insert_score_components(
        &self,
        lead_id: &str,
        client_id: &str,
        components: &ScoreComponents,
    ) -> CadenceResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            outcome_ops::insert_score_components(conn, lead_id, client_id, components)
        })
    }

    pub fn upsert_client(
        &self,
        client_id: &str,
        industry_segment: Option<&str>,
    ) -> CadenceResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| outcome_ops::upsert_client(conn, client_id, industry_segment))
    }

    pub fn record_conversion(&self, event: &ConversionEvent) -> CadenceResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| outcome_ops::record_conversion(conn, event))
    }

    fn check_admission(pattern: &Pattern) -> CadenceResult<()> {
        let refuse = |reason: String| {
            Err(CadenceError::Store(StoreError::AdmissionRefused { reason }))
        };
        if !pattern.payload_matches_type() {
            return refuse(format!(
                "payload case does not match declared type {}",
                pattern.pattern_type.as_str()
            ));
        }
        let min = pattern.pattern_type.min_sample_size();
        if pattern.sample_size < min {
            return refuse(format!(
                "sample size {} below minimum {} for {}",
                pattern.sample_size,
                min,
                pattern.pattern_type.as_str()
            ));
        }
        if let PatternPayload::Who(who) = &pattern.payload {
            if !who.weights.is_valid() {
                return refuse("weight vector violates bounds or sum".to_string());
            }
        }
        if !(0.0..=1.0).contains(&pattern.confidence) {
            return refuse(format!("confidence {} outside [0, 1]", pattern.confidence));
        }
        Ok(())
    }
}

impl IPatternStore for StoreEngine {
    fn write(&self, pattern: &Pattern) -> CadenceResult<WriteOutcome> {
        Self::check_admission(pattern)?;
        let outcome = self
            .pool
            .writer
            .with_conn_sync(|conn| pattern_ops::write_pattern(conn, pattern))?;
        if outcome == WriteOutcome::Applied {
            self.watermarks
                .bump(&pattern.scope, pattern.pattern_type, pattern.computed_at);
            tracing::info!(
                scope = %pattern.scope.key(),
                pattern_type = pattern.pattern_type.as_str(),
                sample_size = pattern.sample_size,
                confidence = pattern.confidence,
                "pattern write applied"
            );
        }
        Ok(outcome)
    }

    fn read_active(
        &self,
        scope: &Scope,
        pattern_type: PatternType,
    ) -> CadenceResult<Option<Pattern>> {
        self.with_reader(|conn| pattern_ops::get_active(conn, scope, pattern_type))
    }

    fn history(&self, scope: &Scope, pattern_type: PatternType) -> CadenceResult<Vec<Pattern>> {
        self.with_reader(|conn| pattern_ops::history(conn, scope, pattern_type))
    }

    fn list_active(&self) -> CadenceResult<Vec<Pattern>> {
        self.with_reader(pattern_ops::list_active)
    }
}

impl IOutcomeReader for StoreEngine {
    fn touches_for_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
    ) -> CadenceResult<Vec<Touch>> {
        self.with_reader(|conn| touch_ops::touches_for_scope(conn, scope, window))
    }

    fn lead_outcomes_for_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
    ) -> CadenceResult<Vec<LeadOutcome>> {
        self.with_reader(|conn| outcome_ops::lead_outcomes_for_scope(conn, scope, window))
    }

    fn conversion_events_for_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
    ) -> CadenceResult<Vec<ConversionEvent>> {
        self.with_reader(|conn| outcome_ops::conversion_events_for_scope(conn, scope, window))
    }

    fn list_client_ids(&self) -> CadenceResult<Vec<String>> {
        self.with_reader(outcome_ops::list_client_ids)
    }

    fn list_industry_segments(&self) -> CadenceResult<Vec<String>> {
        self.with_reader(outcome_ops::list_industry_segments)
    }
}

impl IClientDirectory for StoreEngine {
    fn industry_segment(&self, client_id: &str) -> CadenceResult<Option<String>> {
        self.with_reader(|conn| outcome_ops::industry_segment(conn, client_id))
    }
}

impl IOpsStore for StoreEngine {
    fn record_health_alert(&self, alert: &HealthAlert) -> CadenceResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| ops_log::record_health_alert(conn, alert))
    }

    fn backfill_complete(&self, job_id: &str, scope: &Scope) -> CadenceResult<bool> {
        self.with_reader(|conn| ops_log::backfill_complete(conn, job_id, scope))
    }

    fn mark_backfill_complete(
        &self,
        job_id: &str,
        scope: &Scope,
        completed_at: DateTime<Utc>,
    ) -> CadenceResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| ops_log::mark_backfill_complete(conn, job_id, scope, completed_at))
    }
}
