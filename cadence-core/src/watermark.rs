//! In-process `computed_at` watermark registry.
//!
//! The store bumps a watermark on every applied pattern write; the resolver
//! revalidates its cache entries against it. Invalidation is therefore tied
//! to actual recomputation, not a blind time-based expiry.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::model::{PatternType, Scope};

/// Shared watermark map keyed by (scope key, pattern type).
#[derive(Debug, Default)]
pub struct WatermarkRegistry {
    inner: DashMap<(String, PatternType), DateTime<Utc>>,
}

impl WatermarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful write. Watermarks only move forward.
    pub fn bump(&self, scope: &Scope, pattern_type: PatternType, computed_at: DateTime<Utc>) {
        let key = (scope.key(), pattern_type);
        let mut entry = self.inner.entry(key).or_insert(computed_at);
        if *entry < computed_at {
            *entry = computed_at;
        }
    }

    pub fn get(&self, scope: &Scope, pattern_type: PatternType) -> Option<DateTime<Utc>> {
        self.inner.get(&(scope.key(), pattern_type)).map(|e| *e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn bump_and_get() {
        let registry = WatermarkRegistry::new();
        let scope = Scope::Client("acme".into());
        assert_eq!(registry.get(&scope, PatternType::Who), None);

        let t = Utc::now();
        registry.bump(&scope, PatternType::Who, t);
        assert_eq!(registry.get(&scope, PatternType::Who), Some(t));
        // Other types are independent.
        assert_eq!(registry.get(&scope, PatternType::How), None);
    }

    #[test]
    fn watermarks_never_move_backwards() {
        let registry = WatermarkRegistry::new();
        let scope = Scope::Platform;
        let t = Utc::now();
        registry.bump(&scope, PatternType::Who, t);
        registry.bump(&scope, PatternType::Who, t - Duration::hours(1));
        assert_eq!(registry.get(&scope, PatternType::Who), Some(t));
    }
}
