//! Boundary traits between the subsystem's components.

mod directory;
mod ops_store;
mod outcome_reader;
mod pattern_store;

pub use directory::IClientDirectory;
pub use ops_store::{AlertSeverity, HealthAlert, IOpsStore};
pub use outcome_reader::IOutcomeReader;
pub use pattern_store::{IPatternStore, WriteOutcome};
