//! # cadence-orchestrator
//!
//! Batch-side driver of the subsystem: decides when jobs run, fans scopes
//! out across a worker pool with bounded retry and isolation, and hosts
//! the learning, health, and backfill jobs.

pub mod jobs;
pub mod logging;
pub mod scheduler;
pub mod worker;

pub use jobs::{BackfillJob, HealthJob, LearningJob, ScopeReport};
pub use scheduler::{JobKind, Scheduler};
pub use worker::WorkerPool;
