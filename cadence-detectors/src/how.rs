//! HOW detector: which channel sequences convert, per lead.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::LearningConfig;
use cadence_core::constants::{MAX_SEQUENCE_LEN, MIN_LIFT_SAMPLE_SIZE, TOP_N_LIFT_ENTRIES};
use cadence_core::model::{
    Channel, HowPayload, Pattern, PatternPayload, PatternType, Scope, SequenceLift, Touch,
};

use crate::confidence::convergence_factor;
use crate::lift::{ranked_lifts, BucketCounts};

/// Detect the HOW pattern for one scope from its touches.
///
/// Touches are grouped per lead in delivery order. For a converted lead the
/// sequence ends at the crediting touch: whatever was sent afterwards did
/// not cause the conversion. Sequences keep their trailing
/// [`MAX_SEQUENCE_LEN`] channels, and lift is computed per lead.
pub fn detect(
    scope: &Scope,
    touches: &[Touch],
    config: &LearningConfig,
    now: DateTime<Utc>,
) -> Option<Pattern> {
    let mut per_lead: BTreeMap<&str, (Vec<Channel>, bool)> = BTreeMap::new();
    for touch in touches {
        let (sequence, converted) = per_lead.entry(&touch.lead_id).or_default();
        if *converted {
            continue; // post-conversion touches are not part of the path
        }
        sequence.push(touch.channel);
        if touch.converted_credit {
            *converted = true;
        }
    }

    let leads = per_lead.len() as u64;
    if leads < MIN_LIFT_SAMPLE_SIZE {
        tracing::debug!(
            scope = %scope.key(),
            leads,
            "insufficient leads for how detection"
        );
        return None;
    }

    let converted_leads = per_lead.values().filter(|(_, c)| *c).count() as u64;
    let baseline = converted_leads as f64 / leads as f64;

    let mut buckets: BTreeMap<Vec<Channel>, BucketCounts> = BTreeMap::new();
    for (mut sequence, converted) in per_lead.into_values() {
        if sequence.len() > MAX_SEQUENCE_LEN {
            sequence.drain(..sequence.len() - MAX_SEQUENCE_LEN);
        }
        buckets.entry(sequence).or_default().observe(converted);
    }

    let mut sequences: Vec<SequenceLift> = ranked_lifts(&buckets, baseline)
        .into_iter()
        .map(|e| SequenceLift {
            channels: e.key,
            lift: e.lift,
            sample_size: e.sample_size,
        })
        .collect();
    if sequences.is_empty() {
        return None;
    }
    sequences.truncate(TOP_N_LIFT_ENTRIES);

    Some(Pattern {
        scope: scope.clone(),
        pattern_type: PatternType::How,
        payload: PatternPayload::How(HowPayload {
            baseline_rate: baseline,
            sequences,
        }),
        sample_size: leads,
        confidence: convergence_factor(converted_leads, leads),
        computed_at: now,
        valid_until: now + Duration::days(i64::from(config.validity_days)),
    })
}
