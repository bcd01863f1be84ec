//! The weekly learning job.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cadence_core::config::CadenceConfig;
use cadence_core::errors::{CadenceError, CadenceResult, StoreError};
use cadence_core::model::{
    Pattern, PatternPayload, PatternType, Scope, TrailingWindow, WeightVector, PLATFORM_PRIORS,
};
use cadence_core::traits::{
    AlertSeverity, HealthAlert, IOpsStore, IOutcomeReader, IPatternStore, WriteOutcome,
};
use cadence_detectors::{how, what, when, who};

use super::{enumerate_scopes, ScopeReport};
use crate::worker::WorkerPool;

/// Recomputes every pattern type for every scope over the trailing window.
///
/// Scopes are independent and each is deterministic for a fixed `now` and
/// unchanged data: running the job twice produces byte-identical payloads,
/// with the second run's only effect being one supersession per pattern.
pub struct LearningJob {
    reader: Arc<dyn IOutcomeReader>,
    patterns: Arc<dyn IPatternStore>,
    ops: Arc<dyn IOpsStore>,
    config: CadenceConfig,
}

impl LearningJob {
    pub fn new(
        reader: Arc<dyn IOutcomeReader>,
        patterns: Arc<dyn IPatternStore>,
        ops: Arc<dyn IOpsStore>,
        config: CadenceConfig,
    ) -> Self {
        Self {
            reader,
            patterns,
            ops,
            config,
        }
    }

    /// Run over the configured trailing window ending at `now`.
    pub fn run(&self, now: DateTime<Utc>) -> CadenceResult<Vec<ScopeReport>> {
        let window = TrailingWindow {
            until: now,
            days: self.config.learning.window_days,
        };
        let scopes = enumerate_scopes(self.reader.as_ref())?;
        tracing::info!(scopes = scopes.len(), window_days = window.days, "learning job started");
        self.run_over(scopes, &window, now)
    }

    pub(crate) fn run_over(
        &self,
        scopes: Vec<Scope>,
        window: &TrailingWindow,
        now: DateTime<Utc>,
    ) -> CadenceResult<Vec<ScopeReport>> {
        let pool = WorkerPool::from_config(&self.config.schedule);
        let results = pool.run_scopes(scopes, |scope| self.learn_scope(scope, window, now));

        let mut reports = Vec::with_capacity(results.len());
        for (scope, result) in results {
            let report = match result {
                Ok(written) => ScopeReport {
                    scope,
                    patterns_written: written,
                    failure: None,
                },
                Err(error) => {
                    self.alert_scope_failure(&scope, &error, now);
                    ScopeReport {
                        scope,
                        patterns_written: 0,
                        failure: Some(error.to_string()),
                    }
                }
            };
            reports.push(report);
        }
        Ok(reports)
    }

    /// Detect and persist all four pattern types for one scope. Returns the
    /// number of patterns applied.
    pub(crate) fn learn_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
        now: DateTime<Utc>,
    ) -> CadenceResult<usize> {
        let outcomes = self.reader.lead_outcomes_for_scope(scope, window)?;
        let touches = self.reader.touches_for_scope(scope, window)?;
        let initial = self.initial_weights(scope)?;
        let learning = &self.config.learning;

        let detected = [
            who::detect(scope, &outcomes, &initial, learning, now),
            what::detect(scope, &touches, learning, now),
            when::detect(scope, &touches, learning, now),
            how::detect(scope, &touches, learning, now),
        ];

        let mut written = 0;
        for pattern in detected.into_iter().flatten() {
            written += usize::from(self.persist(&pattern)?);
        }
        tracing::debug!(scope = %scope.key(), written, "scope learned");
        Ok(written)
    }

    /// The optimizer starts from the scope's active weights so a stable
    /// scope drifts instead of jumping.
    fn initial_weights(&self, scope: &Scope) -> CadenceResult<WeightVector> {
        let active = self.patterns.read_active(scope, PatternType::Who)?;
        Ok(match active.map(|p| p.payload) {
            Some(PatternPayload::Who(payload)) if payload.weights.is_valid() => payload.weights,
            _ => PLATFORM_PRIORS,
        })
    }

    fn persist(&self, pattern: &Pattern) -> CadenceResult<bool> {
        match self.patterns.write(pattern) {
            Ok(WriteOutcome::Applied) => Ok(true),
            Ok(WriteOutcome::DiscardedStale) => Ok(false),
            // The detector gates should make this unreachable; a refusal is
            // a data bug to flag, not a reason to fail the scope.
            Err(CadenceError::Store(StoreError::AdmissionRefused { reason })) => {
                tracing::warn!(
                    scope = %pattern.scope.key(),
                    pattern_type = pattern.pattern_type.as_str(),
                    reason,
                    "detected pattern refused at admission"
                );
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    fn alert_scope_failure(&self, scope: &Scope, error: &CadenceError, now: DateTime<Utc>) {
        tracing::error!(scope = %scope.key(), %error, "scope failed after retries");
        let alert = HealthAlert {
            scope: scope.clone(),
            pattern_type: PatternType::Who,
            severity: AlertSeverity::Critical,
            message: format!("learning failed: {error}"),
            observed_confidence: 0.0,
            observed_sample_size: 0,
            created_at: now,
        };
        if let Err(log_error) = self.ops.record_health_alert(&alert) {
            tracing::error!(%log_error, "failed to record scope-failure alert");
        }
    }
}
