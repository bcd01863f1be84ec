use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Batch-orchestrator scheduling and isolation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weekly_interval_secs: u64,
    pub daily_interval_secs: u64,
    /// Bounded retry count per scope unit.
    pub max_retries: u32,
    /// Initial backoff between retries (milliseconds); doubles per attempt.
    pub retry_backoff_ms: u64,
    /// Worker threads draining the scope queue.
    pub workers: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekly_interval_secs: defaults::DEFAULT_WEEKLY_INTERVAL_SECS,
            daily_interval_secs: defaults::DEFAULT_DAILY_INTERVAL_SECS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
            workers: defaults::DEFAULT_WORKERS,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "schedule.workers".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.weekly_interval_secs == 0 || self.daily_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "schedule".into(),
                reason: "intervals must be non-zero".into(),
            });
        }
        Ok(())
    }
}
