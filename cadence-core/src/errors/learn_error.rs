/// Errors raised while computing patterns for a single scope.
///
/// These are contained by the orchestrator's per-scope retry loop and never
/// reach the resolver's read path.
#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    #[error("scope {scope} computation failed: {reason}")]
    ScopeFailed { scope: String, reason: String },

    #[error("scope {scope} exhausted {attempts} attempts: {reason}")]
    RetriesExhausted {
        scope: String,
        attempts: u32,
        reason: String,
    },
}
