use crate::errors::CadenceResult;
use crate::model::{Pattern, PatternType, Scope};

/// Result of a pattern write under the last-writer-wins rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The pattern became the active row (any previous active row moved to
    /// history).
    Applied,
    /// A concurrent writer already landed a newer `computed_at`; this
    /// result was discarded and logged, never merged.
    DiscardedStale,
}

/// Versioned, scope-keyed pattern persistence.
///
/// The store is a dumb fact table: `read_active` does NOT evaluate expiry
/// (that is the resolver's job).
pub trait IPatternStore: Send + Sync {
    /// Transactional supersede-then-insert keyed by (scope, pattern_type).
    ///
    /// The admission gate is re-checked here: a pattern below its type's
    /// minimum sample size, or a WHO pattern with an invalid weight vector,
    /// is refused.
    fn write(&self, pattern: &Pattern) -> CadenceResult<WriteOutcome>;

    /// The current active row, or `None`. Expired rows are still returned.
    fn read_active(
        &self,
        scope: &Scope,
        pattern_type: PatternType,
    ) -> CadenceResult<Option<Pattern>>;

    /// Superseded versions, oldest first. Append-only.
    fn history(&self, scope: &Scope, pattern_type: PatternType) -> CadenceResult<Vec<Pattern>>;

    /// All currently active rows across scopes (health job input).
    fn list_active(&self) -> CadenceResult<Vec<Pattern>>;
}
