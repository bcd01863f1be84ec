//! # cadence-core
//!
//! Foundation crate for the Cadence pattern-learning subsystem.
//! Defines all domain types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod model;
pub mod traits;
pub mod watermark;

// Re-export the most commonly used types at the crate root.
pub use config::CadenceConfig;
pub use errors::{CadenceError, CadenceResult};
pub use model::{
    Pattern, PatternPayload, PatternType, ResolvedWeights, Scope, ScoreComponents, SourceTag,
    Touch, TrailingWindow, WeightVector,
};
pub use watermark::WatermarkRegistry;
