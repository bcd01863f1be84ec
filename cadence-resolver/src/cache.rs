//! Watermark-validated weight cache.
//!
//! Entries are keyed by client id and carry a snapshot of the WHO
//! watermarks across every tier they could have resolved through. A cache
//! hit is revalidated against the live registry: any tier recomputed since
//! the entry was built invalidates it. The TTL is only a backstop for
//! watermark sources outside this process.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;

use cadence_core::model::{PatternType, ResolvedWeights, Scope};
use cadence_core::WatermarkRegistry;

const CACHE_CAPACITY: u64 = 10_000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Watermarks of the (client, industry, platform) WHO tiers at build time.
pub(crate) type TierSnapshot = [Option<DateTime<Utc>>; 3];

#[derive(Clone)]
pub(crate) struct CachedWeights {
    pub resolved: ResolvedWeights,
    pub snapshot: TierSnapshot,
}

pub(crate) struct WeightCache {
    inner: Cache<String, CachedWeights>,
    watermarks: Arc<WatermarkRegistry>,
}

impl WeightCache {
    pub fn new(watermarks: Arc<WatermarkRegistry>) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
            watermarks,
        }
    }

    /// Current WHO watermarks for the tiers a client can resolve through.
    pub fn snapshot(&self, client_id: &str, industry: Option<&str>) -> TierSnapshot {
        [
            self.watermarks
                .get(&Scope::Client(client_id.to_string()), PatternType::Who),
            industry.and_then(|segment| {
                self.watermarks
                    .get(&Scope::Industry(segment.to_string()), PatternType::Who)
            }),
            self.watermarks.get(&Scope::Platform, PatternType::Who),
        ]
    }

    /// A hit is only served when no tier has been recomputed since the
    /// entry was built.
    pub fn get_valid(&self, client_id: &str, current: &TierSnapshot) -> Option<ResolvedWeights> {
        let entry = self.inner.get(client_id)?;
        if entry.snapshot == *current {
            Some(entry.resolved)
        } else {
            tracing::debug!(client_id, "weight cache entry stale, recomputing");
            self.inner.invalidate(client_id);
            None
        }
    }

    pub fn insert(&self, client_id: &str, resolved: ResolvedWeights, snapshot: TierSnapshot) {
        self.inner
            .insert(client_id.to_string(), CachedWeights { resolved, snapshot });
    }
}
