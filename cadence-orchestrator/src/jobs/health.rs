//! The daily health job. Flags only: it never deletes or rewrites.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cadence_core::constants::PLATFORM_CONFIDENCE_GATE;
use cadence_core::errors::CadenceResult;
use cadence_core::model::Pattern;
use cadence_core::traits::{AlertSeverity, HealthAlert, IOpsStore, IPatternStore};

/// Re-evaluates every active pattern against expiry and the confidence and
/// sample thresholds, appending findings to the health ledger.
pub struct HealthJob {
    patterns: Arc<dyn IPatternStore>,
    ops: Arc<dyn IOpsStore>,
}

impl HealthJob {
    pub fn new(patterns: Arc<dyn IPatternStore>, ops: Arc<dyn IOpsStore>) -> Self {
        Self { patterns, ops }
    }

    pub fn run(&self, now: DateTime<Utc>) -> CadenceResult<Vec<HealthAlert>> {
        let active = self.patterns.list_active()?;
        let mut alerts = Vec::new();
        for pattern in &active {
            alerts.extend(self.evaluate(pattern, now));
        }
        for alert in &alerts {
            tracing::warn!(
                scope = %alert.scope.key(),
                pattern_type = alert.pattern_type.as_str(),
                severity = alert.severity.as_str(),
                message = alert.message,
                "pattern health finding"
            );
            self.ops.record_health_alert(alert)?;
        }
        tracing::info!(active = active.len(), findings = alerts.len(), "health job finished");
        Ok(alerts)
    }

    fn evaluate(&self, pattern: &Pattern, now: DateTime<Utc>) -> Vec<HealthAlert> {
        let mut findings = Vec::new();
        let alert = |severity, message: String| HealthAlert {
            scope: pattern.scope.clone(),
            pattern_type: pattern.pattern_type,
            severity,
            message,
            observed_confidence: pattern.confidence,
            observed_sample_size: pattern.sample_size,
            created_at: now,
        };

        if pattern.is_expired(now) {
            findings.push(alert(
                AlertSeverity::Warning,
                format!("expired at {}, awaiting recomputation", pattern.valid_until),
            ));
        }
        if pattern.confidence < PLATFORM_CONFIDENCE_GATE {
            findings.push(alert(
                AlertSeverity::Warning,
                format!(
                    "confidence {:.3} below the lowest resolution gate",
                    pattern.confidence
                ),
            ));
        }
        if pattern.sample_size < pattern.pattern_type.min_sample_size() {
            findings.push(alert(
                AlertSeverity::Critical,
                format!(
                    "sample size {} below the admission minimum {}",
                    pattern.sample_size,
                    pattern.pattern_type.min_sample_size()
                ),
            ));
        }
        findings
    }
}
