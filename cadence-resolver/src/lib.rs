//! # cadence-resolver
//!
//! Read-time resolution of learned patterns with tiered fallback. Sits on
//! the lead-scoring hot path, so it never propagates an error: a store
//! failure degrades to the next tier with a warning, and the final tier is
//! a compile-time constant.

mod cache;
mod resolver;

pub use resolver::WeightResolver;
