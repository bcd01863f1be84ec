use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Constrained-optimizer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub max_iterations: usize,
    pub initial_step: f64,
    pub min_step: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: defaults::DEFAULT_MAX_ITERATIONS,
            initial_step: defaults::DEFAULT_INITIAL_STEP,
            min_step: defaults::DEFAULT_MIN_STEP,
        }
    }
}

/// Learning-job configuration shared by the detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Trailing window over the outcome store (days).
    pub window_days: u32,
    /// Pattern validity horizon after `computed_at` (days).
    pub validity_days: u32,
    pub optimizer: OptimizerConfig,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            window_days: defaults::DEFAULT_WINDOW_DAYS,
            validity_days: defaults::DEFAULT_VALIDITY_DAYS,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::Invalid {
                field: "learning.window_days".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.validity_days == 0 {
            return Err(ConfigError::Invalid {
                field: "learning.validity_days".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.optimizer.min_step <= 0.0 || self.optimizer.initial_step < self.optimizer.min_step {
            return Err(ConfigError::Invalid {
                field: "learning.optimizer".into(),
                reason: "initial_step must be >= min_step > 0".into(),
            });
        }
        Ok(())
    }
}
