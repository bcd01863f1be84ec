//! Shared bucket-counting and lift-ranking machinery for the WHAT, WHEN,
//! and HOW detectors.

use std::collections::BTreeMap;

use cadence_core::constants::MIN_BUCKET_SAMPLE;

/// Observation counts for one bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketCounts {
    pub total: u64,
    pub converted: u64,
}

impl BucketCounts {
    pub fn observe(&mut self, converted: bool) {
        self.total += 1;
        if converted {
            self.converted += 1;
        }
    }

    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.converted as f64 / self.total as f64
        }
    }
}

/// One bucket's lift against the scope baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LiftEntry<K> {
    pub key: K,
    pub lift: f64,
    pub conversion_rate: f64,
    pub sample_size: u64,
}

/// Rank buckets by lift, descending. Buckets thinner than
/// [`MIN_BUCKET_SAMPLE`] are dropped so a single lucky observation cannot
/// dominate the table. Ties break on the bucket key, so the ranking is
/// deterministic for identical input.
pub fn ranked_lifts<K: Ord + Clone>(
    buckets: &BTreeMap<K, BucketCounts>,
    baseline: f64,
) -> Vec<LiftEntry<K>> {
    if baseline <= 0.0 {
        return Vec::new();
    }
    let mut entries: Vec<LiftEntry<K>> = buckets
        .iter()
        .filter(|(_, counts)| counts.total >= MIN_BUCKET_SAMPLE)
        .map(|(key, counts)| LiftEntry {
            key: key.clone(),
            lift: counts.rate() / baseline,
            conversion_rate: counts.rate(),
            sample_size: counts.total,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.lift
            .partial_cmp(&a.lift)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(total: u64, converted: u64) -> BucketCounts {
        BucketCounts { total, converted }
    }

    #[test]
    fn thin_buckets_are_dropped() {
        let mut buckets = BTreeMap::new();
        buckets.insert("a", counts(9, 9));
        buckets.insert("b", counts(50, 10));
        let ranked = ranked_lifts(&buckets, 0.1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "b");
        assert!((ranked[0].lift - 2.0).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_descending_with_key_tiebreak() {
        let mut buckets = BTreeMap::new();
        buckets.insert("low", counts(100, 5));
        buckets.insert("high", counts(100, 30));
        buckets.insert("also_high", counts(100, 30));
        let ranked = ranked_lifts(&buckets, 0.1);
        assert_eq!(
            ranked.iter().map(|e| e.key).collect::<Vec<_>>(),
            vec!["also_high", "high", "low"]
        );
    }

    #[test]
    fn zero_baseline_yields_nothing() {
        let mut buckets = BTreeMap::new();
        buckets.insert("a", counts(100, 10));
        assert!(ranked_lifts(&buckets, 0.0).is_empty());
    }
}
