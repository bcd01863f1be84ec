//! WHO detector: which kind of lead converts, expressed as an optimized
//! weight vector over the five score components plus tercile evidence.

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::LearningConfig;
use cadence_core::constants::MIN_WHO_SAMPLE_SIZE;
use cadence_core::model::{
    AttributeBucket, ComponentKind, LeadOutcome, Pattern, PatternPayload, PatternType, Scope,
    Tercile, WeightVector, WhoPayload,
};
use cadence_optimizer::optimize;

use crate::confidence::{holdout_split, who_confidence};
use crate::lift::BucketCounts;

/// Detect the WHO pattern for one scope from per-lead outcomes.
///
/// `initial` is the currently active weight vector for the scope (or the
/// platform priors when none exists); the optimizer starts there so stable
/// scopes drift rather than jump. The optimizer trains only on the retained
/// split; held-out leads are reserved for the confidence estimate. Returns
/// `None` below the sample gate.
pub fn detect(
    scope: &Scope,
    outcomes: &[LeadOutcome],
    initial: &WeightVector,
    config: &LearningConfig,
    now: DateTime<Utc>,
) -> Option<Pattern> {
    if (outcomes.len() as u64) < MIN_WHO_SAMPLE_SIZE {
        tracing::debug!(
            scope = %scope.key(),
            leads = outcomes.len(),
            "insufficient leads for who detection"
        );
        return None;
    }

    let (training, _) = holdout_split(outcomes);
    let pairs: Vec<_> = training
        .iter()
        .map(|o| (o.components, o.converted))
        .collect();
    let result = optimize(&pairs, initial, &config.optimizer);
    // Lift is reported against the static priors over the same training
    // split, not the starting vector, so re-running on unchanged data
    // reproduces the payload exactly even though the optimizer seeds from
    // the active weights.
    let baseline = prior_correlation(&training);
    if !result.converged {
        tracing::warn!(
            scope = %scope.key(),
            iterations = result.iterations,
            "weight optimization did not converge, keeping initial vector"
        );
    }

    let confidence = who_confidence(&result.weights, outcomes);

    Some(Pattern {
        scope: scope.clone(),
        pattern_type: PatternType::Who,
        payload: PatternPayload::Who(WhoPayload {
            weights: result.weights,
            baseline_correlation: baseline,
            optimized_correlation: result.objective,
            converged: result.converged,
            buckets: tercile_buckets(outcomes),
        }),
        sample_size: outcomes.len() as u64,
        confidence,
        computed_at: now,
        valid_until: now + Duration::days(i64::from(config.validity_days)),
    })
}

/// Point-biserial of the static prior composite, 0 when undefined.
fn prior_correlation(outcomes: &[&LeadOutcome]) -> f64 {
    let composites: Vec<f64> = outcomes
        .iter()
        .map(|o| cadence_core::model::PLATFORM_PRIORS.composite(&o.components))
        .collect();
    let converted: Vec<bool> = outcomes.iter().map(|o| o.converted).collect();
    cadence_optimizer::point_biserial(&composites, &converted).unwrap_or(0.0)
}

/// Per-component tercile conversion rates, the human-readable evidence
/// behind the weight vector.
fn tercile_buckets(outcomes: &[LeadOutcome]) -> Vec<AttributeBucket> {
    let mut buckets = Vec::with_capacity(ComponentKind::ALL.len() * 3);
    for (idx, component) in ComponentKind::ALL.iter().enumerate() {
        let mut values: Vec<f64> = outcomes
            .iter()
            .map(|o| o.components.as_array()[idx])
            .collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let t1 = values[values.len() / 3];
        let t2 = values[values.len() * 2 / 3];

        let mut counts = [BucketCounts::default(); 3];
        for outcome in outcomes {
            let v = outcome.components.as_array()[idx];
            let slot = if v < t1 {
                0
            } else if v < t2 {
                1
            } else {
                2
            };
            counts[slot].observe(outcome.converted);
        }

        for (tercile, c) in [Tercile::Low, Tercile::Mid, Tercile::High]
            .into_iter()
            .zip(counts)
        {
            buckets.push(AttributeBucket {
                component: *component,
                bucket: tercile,
                conversion_rate: c.rate(),
                sample_size: c.total,
            });
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::model::{ScoreComponents, PLATFORM_PRIORS};

    fn outcomes(n: usize) -> Vec<LeadOutcome> {
        (0..n)
            .map(|i| {
                let converted = i % 3 == 0;
                LeadOutcome {
                    lead_id: format!("lead-{i}"),
                    components: ScoreComponents {
                        data_quality: 50.0 + (i % 11) as f64,
                        authority: if converted { 88.0 } else { 22.0 },
                        company_fit: 55.0 - (i % 7) as f64,
                        timing: 45.0,
                        risk: 50.0 + (i % 5) as f64,
                    },
                    converted,
                }
            })
            .collect()
    }

    #[test]
    fn below_gate_returns_none() {
        let data = outcomes(49);
        let config = LearningConfig::default();
        assert!(detect(&Scope::Platform, &data, &PLATFORM_PRIORS, &config, Utc::now()).is_none());
    }

    #[test]
    fn at_gate_detects_and_optimizes() {
        let data = outcomes(120);
        let config = LearningConfig::default();
        let now = Utc::now();
        let pattern = detect(
            &Scope::Client("acme".into()),
            &data,
            &PLATFORM_PRIORS,
            &config,
            now,
        )
        .expect("pattern");

        assert_eq!(pattern.sample_size, 120);
        assert_eq!(pattern.valid_until, now + Duration::days(14));
        let PatternPayload::Who(who) = &pattern.payload else {
            panic!("expected who payload");
        };
        assert!(who.converged);
        assert!(who.weights.is_valid());
        assert!(who.optimized_correlation >= who.baseline_correlation);
        // authority fully separates the classes
        assert!(who.weights.authority > 0.39);
        assert!(pattern.confidence > 0.5, "confidence = {}", pattern.confidence);
    }

    #[test]
    fn tercile_buckets_cover_every_component() {
        let data = outcomes(90);
        let buckets = tercile_buckets(&data);
        assert_eq!(buckets.len(), 15);
        assert_eq!(buckets.iter().map(|b| b.sample_size).sum::<u64>(), 90 * 5);

        // High-authority tercile converts, low never does.
        let authority_high = buckets
            .iter()
            .find(|b| b.component == ComponentKind::Authority && b.bucket == Tercile::High)
            .unwrap();
        let authority_low = buckets
            .iter()
            .find(|b| b.component == ComponentKind::Authority && b.bucket == Tercile::Low)
            .unwrap();
        assert!(authority_high.conversion_rate > authority_low.conversion_rate);
    }

    #[test]
    fn optimizer_trains_only_on_the_retained_split() {
        let data = outcomes(120);
        let config = LearningConfig::default();
        let pattern = detect(&Scope::Platform, &data, &PLATFORM_PRIORS, &config, Utc::now())
            .expect("pattern");
        let PatternPayload::Who(who) = &pattern.payload else {
            panic!("expected who payload");
        };

        let (training, holdout) = holdout_split(&data);
        assert!(!holdout.is_empty());
        let pairs: Vec<_> = training
            .iter()
            .map(|o| (o.components, o.converted))
            .collect();
        let expected = optimize(&pairs, &PLATFORM_PRIORS, &config.optimizer);
        assert_eq!(who.weights, expected.weights);
        assert_eq!(who.optimized_correlation, expected.objective);
    }

    #[test]
    fn detection_is_deterministic() {
        let data = outcomes(100);
        let config = LearningConfig::default();
        let now = Utc::now();
        let scope = Scope::Platform;
        let a = detect(&scope, &data, &PLATFORM_PRIORS, &config, now).unwrap();
        let b = detect(&scope, &data, &PLATFORM_PRIORS, &config, now).unwrap();
        assert_eq!(a.payload, b.payload);
        assert_eq!(a.confidence, b.confidence);
    }
}
