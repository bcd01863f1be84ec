//! Query modules, one per table family.

pub mod ops_log;
pub mod outcome_ops;
pub mod pattern_ops;
pub mod touch_ops;

use cadence_core::model::Scope;

/// SQL fragment restricting a client-id column to a scope, plus its params.
/// Platform scope matches everything.
pub(crate) fn scope_clause(scope: &Scope, column: &str) -> (String, Vec<String>) {
    match scope {
        Scope::Client(id) => (format!("{column} = ?"), vec![id.clone()]),
        Scope::Industry(segment) => (
            format!("{column} IN (SELECT client_id FROM clients WHERE industry_segment = ?)"),
            vec![segment.clone()],
        ),
        Scope::Platform => ("1 = 1".to_string(), Vec::new()),
    }
}
