use crate::errors::CadenceResult;
use crate::model::{ConversionEvent, LeadOutcome, Scope, Touch, TrailingWindow};

/// Read-only boundary to the Outcome Store.
///
/// This subsystem never writes through this trait; the channel engines and
/// the external conversion marker own the write side.
pub trait IOutcomeReader: Send + Sync {
    /// All touches for a scope within the trailing window, ordered by
    /// `occurred_at` then id.
    fn touches_for_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
    ) -> CadenceResult<Vec<Touch>>;

    /// Per-lead (score components, outcome) pairs for leads with at least
    /// one touch in the window.
    fn lead_outcomes_for_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
    ) -> CadenceResult<Vec<LeadOutcome>>;

    /// Conversion-credit ledger entries for the scope within the window.
    fn conversion_events_for_scope(
        &self,
        scope: &Scope,
        window: &TrailingWindow,
    ) -> CadenceResult<Vec<ConversionEvent>>;

    /// Every client id with at least one touch on record.
    fn list_client_ids(&self) -> CadenceResult<Vec<String>>;

    /// Every distinct industry segment with at least one client.
    fn list_industry_segments(&self) -> CadenceResult<Vec<String>>;
}
