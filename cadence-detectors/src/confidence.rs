//! Confidence scoring for detected patterns.
//!
//! Two ingredients:
//! - a Beta-posterior convergence factor over the scope conversion rate,
//!   Beta(1+k, 1+n-k) with a uniform prior: the narrower the 95% credible
//!   interval, the more settled the estimate;
//! - for WHO patterns, a held-out predictive check: leads are split 80/20
//!   by a blake3 hash of `lead_id` (deterministic, stable across runs) and
//!   the optimized weights are scored on the 20% the optimizer never saw.

use statrs::distribution::{Beta, ContinuousCDF};

use cadence_core::constants::{HOLDOUT_MODULUS, MIN_HOLDOUT_SAMPLE};
use cadence_core::model::{LeadOutcome, WeightVector};
use cadence_optimizer::point_biserial;

/// Beta posterior over a conversion rate, uniform Beta(1, 1) prior.
#[derive(Debug, Clone, Copy)]
pub struct BetaPosterior {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaPosterior {
    pub fn from_counts(successes: u64, total: u64) -> Self {
        let k = successes.min(total) as f64;
        let n = total as f64;
        Self {
            alpha: 1.0 + k,
            beta: 1.0 + (n - k),
        }
    }

    /// 95% equal-tailed credible interval via the inverse CDF. Falls back
    /// to the full unit interval when the distribution degenerates.
    pub fn credible_interval_95(&self) -> (f64, f64) {
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return (0.0, 1.0);
        }
        match Beta::new(self.alpha, self.beta) {
            Ok(dist) => {
                let low = dist.inverse_cdf(0.025);
                let high = dist.inverse_cdf(0.975);
                let low = if low.is_finite() { low.clamp(0.0, 1.0) } else { 0.0 };
                let high = if high.is_finite() { high.clamp(0.0, 1.0) } else { 1.0 };
                (low.min(high), high.max(low))
            }
            Err(_) => (0.0, 1.0),
        }
    }
}

/// Convergence factor in [0, 1]: 1 minus half the 95% credible-interval
/// width of the scope conversion rate. Approaches 1 as evidence
/// accumulates, 0 for a near-uniform posterior.
pub fn convergence_factor(successes: u64, total: u64) -> f64 {
    let (low, high) = BetaPosterior::from_counts(successes, total).credible_interval_95();
    (1.0 - (high - low) / 2.0).clamp(0.0, 1.0)
}

/// Whether a lead lands in the held-out split. Keyed on the lead id so the
/// assignment is stable across runs and scopes.
pub fn in_holdout(lead_id: &str) -> bool {
    let hash = blake3::hash(lead_id.as_bytes());
    hash.as_bytes()[0] % HOLDOUT_MODULUS == 0
}

/// Partition per-lead outcomes into (training, held-out) slices.
pub fn holdout_split(outcomes: &[LeadOutcome]) -> (Vec<&LeadOutcome>, Vec<&LeadOutcome>) {
    outcomes.iter().partition(|o| !in_holdout(&o.lead_id))
}

/// WHO confidence: held-out point-biserial of the weighted composite,
/// clamped to [0, 1], times the convergence factor.
///
/// When the held-out split is too small to trust (or degenerate), the
/// full-sample correlation stands in for the held-out one.
pub fn who_confidence(weights: &WeightVector, outcomes: &[LeadOutcome]) -> f64 {
    let conversions = outcomes.iter().filter(|o| o.converted).count() as u64;
    let convergence = convergence_factor(conversions, outcomes.len() as u64);

    let score = |subset: &[&LeadOutcome]| {
        let composites: Vec<f64> = subset
            .iter()
            .map(|o| weights.composite(&o.components))
            .collect();
        let converted: Vec<bool> = subset.iter().map(|o| o.converted).collect();
        point_biserial(&composites, &converted)
    };

    let (_, holdout) = holdout_split(outcomes);
    let predictive = if holdout.len() >= MIN_HOLDOUT_SAMPLE {
        score(&holdout)
    } else {
        None
    }
    .or_else(|| score(&outcomes.iter().collect::<Vec<_>>()))
    .unwrap_or(0.0);

    (predictive.clamp(0.0, 1.0) * convergence).clamp(0.0, 1.0)
}
