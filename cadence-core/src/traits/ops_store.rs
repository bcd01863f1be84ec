use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CadenceResult;
use crate::model::{PatternType, Scope};

/// Severity of a health-job finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "warning" => Some(AlertSeverity::Warning),
            "critical" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }
}

/// A degradation finding emitted by the daily health job. Flags only: the
/// health job never deletes or rewrites a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub scope: Scope,
    pub pattern_type: PatternType,
    pub severity: AlertSeverity,
    pub message: String,
    pub observed_confidence: f64,
    pub observed_sample_size: u64,
    pub created_at: DateTime<Utc>,
}

/// Operational bookkeeping owned by the batch orchestrator: the append-only
/// health-alert ledger and per-scope backfill checkpoints (checkpoint by
/// scope, not by row, so a partial backfill failure never redoes completed
/// scopes).
pub trait IOpsStore: Send + Sync {
    fn record_health_alert(&self, alert: &HealthAlert) -> CadenceResult<()>;

    fn backfill_complete(&self, job_id: &str, scope: &Scope) -> CadenceResult<bool>;

    fn mark_backfill_complete(
        &self,
        job_id: &str,
        scope: &Scope,
        completed_at: DateTime<Utc>,
    ) -> CadenceResult<()>;
}
