//! # cadence-optimizer
//!
//! Constrained weight optimization for the WHO detector. Given per-lead
//! (score components, outcome) pairs, finds the weight vector on the
//! bounded simplex that maximizes the point-biserial correlation between
//! the weighted composite score and the binary conversion outcome.
//!
//! Fully deterministic: no RNG, no wall-clock reads. Identical input
//! produces an identical result.

pub mod objective;
pub mod solver;

pub use objective::point_biserial;
pub use solver::{optimize, OptimizationResult};
