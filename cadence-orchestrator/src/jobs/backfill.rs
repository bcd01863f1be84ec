//! The manually triggered backfill job.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cadence_core::config::CadenceConfig;
use cadence_core::errors::CadenceResult;
use cadence_core::model::TrailingWindow;
use cadence_core::traits::{IOpsStore, IOutcomeReader, IPatternStore};

use super::{enumerate_scopes, LearningJob, ScopeReport};
use crate::worker::WorkerPool;

/// Runs the learning logic over a long historical window, checkpointing
/// per scope: a re-run of the same `job_id` skips scopes that already
/// completed, so a partial failure resumes instead of redoing work.
pub struct BackfillJob {
    reader: Arc<dyn IOutcomeReader>,
    ops: Arc<dyn IOpsStore>,
    learning: LearningJob,
    config: CadenceConfig,
}

impl BackfillJob {
    pub fn new(
        reader: Arc<dyn IOutcomeReader>,
        patterns: Arc<dyn IPatternStore>,
        ops: Arc<dyn IOpsStore>,
        config: CadenceConfig,
    ) -> Self {
        let learning = LearningJob::new(
            reader.clone(),
            patterns,
            ops.clone(),
            config.clone(),
        );
        Self {
            reader,
            ops,
            learning,
            config,
        }
    }

    /// `history_days` is the full window to rebuild from, typically much
    /// longer than the weekly job's trailing window.
    pub fn run(
        &self,
        job_id: &str,
        history_days: u32,
        now: DateTime<Utc>,
    ) -> CadenceResult<Vec<ScopeReport>> {
        let window = TrailingWindow {
            until: now,
            days: history_days,
        };
        let scopes = enumerate_scopes(self.reader.as_ref())?;
        tracing::info!(job_id, scopes = scopes.len(), history_days, "backfill started");

        let pool = WorkerPool::from_config(&self.config.schedule);
        let results = pool.run_scopes(scopes, |scope| {
            if self.ops.backfill_complete(job_id, scope)? {
                tracing::debug!(job_id, scope = %scope.key(), "scope already backfilled, skipping");
                return Ok(None);
            }
            let written = self.learning.learn_scope(scope, &window, now)?;
            self.ops.mark_backfill_complete(job_id, scope, now)?;
            Ok(Some(written))
        });

        let mut reports = Vec::with_capacity(results.len());
        for (scope, result) in results {
            let report = match result {
                Ok(written) => ScopeReport {
                    scope,
                    patterns_written: written.unwrap_or(0),
                    failure: None,
                },
                Err(error) => ScopeReport {
                    scope,
                    patterns_written: 0,
                    failure: Some(error.to_string()),
                },
            };
            reports.push(report);
        }
        Ok(reports)
    }
}
