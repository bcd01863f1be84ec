//! The tiered weight resolver.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cadence_core::constants::{
    CLIENT_CONFIDENCE_GATE, CLIENT_SAMPLE_GATE, INDUSTRY_CONFIDENCE_GATE, PLATFORM_CONFIDENCE_GATE,
};
use cadence_core::errors::CadenceResult;
use cadence_core::model::{
    Pattern, PatternPayload, PatternType, ResolvedWeights, Scope, SourceTag, WeightVector,
    HARDCODED_DEFAULT, PLATFORM_PRIORS,
};
use cadence_core::traits::{IClientDirectory, IPatternStore};
use cadence_core::WatermarkRegistry;

use crate::cache::WeightCache;

/// Resolves the weight vector (and the WHEN/HOW guidance patterns) for a
/// client at read time.
///
/// Fall-through order for weights: client-learned, industry-learned,
/// platform-learned, static priors, hardcoded default. Expiry always beats
/// confidence: a stale pattern is skipped no matter how strong it once was.
/// Resolution is side-effect-free and infallible by construction.
pub struct WeightResolver {
    store: Arc<dyn IPatternStore>,
    directory: Arc<dyn IClientDirectory>,
    cache: WeightCache,
}

impl WeightResolver {
    pub fn new(
        store: Arc<dyn IPatternStore>,
        directory: Arc<dyn IClientDirectory>,
        watermarks: Arc<WatermarkRegistry>,
    ) -> Self {
        Self {
            store,
            directory,
            cache: WeightCache::new(watermarks),
        }
    }

    /// Resolve the scoring weights for a client. Never fails: the deepest
    /// tier is a constant.
    pub fn resolve_weights(&self, client_id: &str) -> CadenceResult<ResolvedWeights> {
        self.resolve_weights_at(client_id, Utc::now())
    }

    /// Same as [`resolve_weights`](Self::resolve_weights) with an explicit
    /// clock, so expiry behavior is testable.
    pub fn resolve_weights_at(
        &self,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> CadenceResult<ResolvedWeights> {
        let industry = self.industry_of(client_id);
        let snapshot = self.cache.snapshot(client_id, industry.as_deref());
        if let Some(hit) = self.cache.get_valid(client_id, &snapshot) {
            return Ok(hit);
        }

        let resolved = self.resolve_uncached(client_id, industry.as_deref(), now);
        self.cache.insert(client_id, resolved.clone(), snapshot);
        Ok(resolved)
    }

    fn resolve_uncached(
        &self,
        client_id: &str,
        industry: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResolvedWeights {
        let client_scope = Scope::Client(client_id.to_string());
        if let Some((weights, computed_at)) =
            self.qualified_who(&client_scope, now, CLIENT_CONFIDENCE_GATE, CLIENT_SAMPLE_GATE)
        {
            return learned(weights, SourceTag::ClientLearned, computed_at);
        }

        if let Some(segment) = industry {
            let scope = Scope::Industry(segment.to_string());
            if let Some((weights, computed_at)) =
                self.qualified_who(&scope, now, INDUSTRY_CONFIDENCE_GATE, 0)
            {
                return learned(weights, SourceTag::IndustryLearned, computed_at);
            }
        }

        if let Some((weights, computed_at)) =
            self.qualified_who(&Scope::Platform, now, PLATFORM_CONFIDENCE_GATE, 0)
        {
            return learned(weights, SourceTag::PlatformLearned, computed_at);
        }

        if PLATFORM_PRIORS.is_valid() {
            return ResolvedWeights {
                weights: PLATFORM_PRIORS,
                source: SourceTag::StaticPriors,
                computed_at: None,
            };
        }
        ResolvedWeights {
            weights: HARDCODED_DEFAULT,
            source: SourceTag::HardcodedDefault,
            computed_at: None,
        }
    }

    /// The active WHO pattern for a scope if it clears the tier's gates.
    fn qualified_who(
        &self,
        scope: &Scope,
        now: DateTime<Utc>,
        confidence_gate: f64,
        sample_gate: u64,
    ) -> Option<(WeightVector, DateTime<Utc>)> {
        let pattern = self.read_tier(scope, PatternType::Who)?;
        if pattern.is_expired(now) {
            return None;
        }
        if pattern.confidence <= confidence_gate || pattern.sample_size < sample_gate {
            return None;
        }
        match &pattern.payload {
            PatternPayload::Who(who) if who.weights.is_valid() => {
                Some((who.weights, pattern.computed_at))
            }
            _ => None,
        }
    }

    /// The freshest unexpired WHEN pattern visible to a scope, walking the
    /// fallback chain. `None` is a valid answer: the consumer simply has no
    /// timing guidance.
    pub fn get_when_pattern(&self, scope: &Scope, now: DateTime<Utc>) -> Option<Pattern> {
        self.get_guidance(scope, PatternType::When, now)
    }

    /// The freshest unexpired HOW pattern visible to a scope.
    pub fn get_how_pattern(&self, scope: &Scope, now: DateTime<Utc>) -> Option<Pattern> {
        self.get_guidance(scope, PatternType::How, now)
    }

    fn get_guidance(
        &self,
        scope: &Scope,
        pattern_type: PatternType,
        now: DateTime<Utc>,
    ) -> Option<Pattern> {
        for tier in self.fallback_chain(scope) {
            if let Some(pattern) = self.read_tier(&tier, pattern_type) {
                if !pattern.is_expired(now) {
                    return Some(pattern);
                }
            }
        }
        None
    }

    fn fallback_chain(&self, scope: &Scope) -> Vec<Scope> {
        match scope {
            Scope::Client(client_id) => {
                let mut chain = vec![scope.clone()];
                if let Some(segment) = self.industry_of(client_id) {
                    chain.push(Scope::Industry(segment));
                }
                chain.push(Scope::Platform);
                chain
            }
            Scope::Industry(_) => vec![scope.clone(), Scope::Platform],
            Scope::Platform => vec![Scope::Platform],
        }
    }

    fn industry_of(&self, client_id: &str) -> Option<String> {
        match self.directory.industry_segment(client_id) {
            Ok(segment) => segment,
            Err(error) => {
                tracing::warn!(client_id, %error, "directory lookup failed, skipping industry tier");
                None
            }
        }
    }

    /// A store error degrades to the next tier instead of surfacing.
    fn read_tier(&self, scope: &Scope, pattern_type: PatternType) -> Option<Pattern> {
        match self.store.read_active(scope, pattern_type) {
            Ok(pattern) => pattern,
            Err(error) => {
                tracing::warn!(
                    scope = %scope.key(),
                    pattern_type = pattern_type.as_str(),
                    %error,
                    "pattern read failed, degrading to next tier"
                );
                None
            }
        }
    }
}

fn learned(
    weights: WeightVector,
    source: SourceTag,
    computed_at: DateTime<Utc>,
) -> ResolvedWeights {
    ResolvedWeights {
        weights,
        source,
        computed_at: Some(computed_at),
    }
}
