//! Error taxonomy for the Cadence subsystem.
//!
//! Insufficient data and pattern expiry are deliberately NOT errors here:
//! detectors signal the former with `Ok(None)` and the resolver treats the
//! latter as ordinary fall-through.

mod config_error;
mod learn_error;
mod store_error;

pub use config_error::ConfigError;
pub use learn_error::LearnError;
pub use store_error::StoreError;

/// Unified error type across all Cadence crates.
#[derive(Debug, thiserror::Error)]
pub enum CadenceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Learn(#[from] LearnError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the workspace.
pub type CadenceResult<T> = Result<T, CadenceError>;
