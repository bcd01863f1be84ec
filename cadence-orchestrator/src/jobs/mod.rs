//! The orchestrator's jobs.

mod backfill;
mod health;
mod learning;

pub use backfill::BackfillJob;
pub use health::HealthJob;
pub use learning::LearningJob;

use cadence_core::errors::CadenceResult;
use cadence_core::model::Scope;
use cadence_core::traits::IOutcomeReader;

/// Per-scope result of a learning or backfill run.
#[derive(Debug, Clone)]
pub struct ScopeReport {
    pub scope: Scope,
    pub patterns_written: usize,
    /// Present when the scope exhausted its retries; siblings still ran.
    pub failure: Option<String>,
}

/// Every scope the batch jobs operate on: one per client, one per industry
/// segment, plus the platform scope.
pub(crate) fn enumerate_scopes(reader: &dyn IOutcomeReader) -> CadenceResult<Vec<Scope>> {
    let mut scopes: Vec<Scope> = reader
        .list_client_ids()?
        .into_iter()
        .map(Scope::Client)
        .collect();
    scopes.extend(
        reader
            .list_industry_segments()?
            .into_iter()
            .map(Scope::Industry),
    );
    scopes.push(Scope::Platform);
    Ok(scopes)
}
