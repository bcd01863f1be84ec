//! Configuration for learning, optimization, and scheduling.

pub mod defaults;

mod learning_config;
mod schedule_config;

pub use learning_config::{LearningConfig, OptimizerConfig};
pub use schedule_config::ScheduleConfig;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level Cadence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub learning: LearningConfig,
    pub schedule: ScheduleConfig,
}

impl CadenceConfig {
    /// Parse from a TOML document. Missing sections and fields take their
    /// defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: CadenceConfig = toml::from_str(input).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.learning.validate()?;
        self.schedule.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CadenceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.learning.window_days, 180);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = CadenceConfig::from_toml_str(
            r#"
            [learning]
            window_days = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.learning.window_days, 90);
        assert_eq!(config.learning.validity_days, 14);
        assert_eq!(config.schedule.max_retries, 2);
    }

    #[test]
    fn invalid_field_rejected() {
        let result = CadenceConfig::from_toml_str(
            r#"
            [learning]
            window_days = 0
            "#,
        );
        assert!(result.is_err());
    }
}
