//! WHAT detector: which content features lift conversion, per touch.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::LearningConfig;
use cadence_core::constants::{MIN_LIFT_SAMPLE_SIZE, TOP_N_LIFT_ENTRIES};
use cadence_core::model::{
    FeatureLift, Pattern, PatternPayload, PatternType, Scope, Touch, WhatPayload,
};

use crate::confidence::convergence_factor;
use crate::lift::{ranked_lifts, BucketCounts};

/// Detect the WHAT pattern for one scope from its touches.
///
/// Each touch contributes one observation per feature it carries; a touch
/// with no content features contributes nothing. Returns `None` below the
/// sample gate or when no bucket survives.
pub fn detect(
    scope: &Scope,
    touches: &[Touch],
    config: &LearningConfig,
    now: DateTime<Utc>,
) -> Option<Pattern> {
    if (touches.len() as u64) < MIN_LIFT_SAMPLE_SIZE {
        tracing::debug!(
            scope = %scope.key(),
            touches = touches.len(),
            "insufficient touches for what detection"
        );
        return None;
    }

    let converted = touches.iter().filter(|t| t.converted_credit).count() as u64;
    let baseline = converted as f64 / touches.len() as f64;

    let mut buckets: BTreeMap<String, BucketCounts> = BTreeMap::new();
    for touch in touches {
        for key in feature_keys(touch) {
            buckets.entry(key).or_default().observe(touch.converted_credit);
        }
    }

    let mut entries: Vec<FeatureLift> = ranked_lifts(&buckets, baseline)
        .into_iter()
        .map(|e| FeatureLift {
            feature: e.key,
            lift: e.lift,
            conversion_rate: e.conversion_rate,
            sample_size: e.sample_size,
        })
        .collect();
    if entries.is_empty() {
        return None;
    }
    entries.truncate(TOP_N_LIFT_ENTRIES);

    Some(Pattern {
        scope: scope.clone(),
        pattern_type: PatternType::What,
        payload: PatternPayload::What(WhatPayload {
            baseline_rate: baseline,
            entries,
        }),
        sample_size: touches.len() as u64,
        confidence: convergence_factor(converted, touches.len() as u64),
        computed_at: now,
        valid_until: now + Duration::days(i64::from(config.validity_days)),
    })
}

/// Normalized `name=value` keys for every feature present on the touch.
fn feature_keys(touch: &Touch) -> Vec<String> {
    let f = &touch.features;
    let mut keys = Vec::new();
    if let Some(v) = f.pain_point_mentioned {
        keys.push(format!("pain_point_mentioned={v}"));
    }
    if let Some(v) = f.subject_length_bucket {
        keys.push(format!("subject_length_bucket={}", v.as_str()));
    }
    if let Some(v) = f.has_question {
        keys.push(format!("has_question={v}"));
    }
    if let Some(v) = f.cta_type {
        keys.push(format!("cta_type={}", v.as_str()));
    }
    if let Some(v) = f.personalization_used {
        keys.push(format!("personalization_used={v}"));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::model::{Channel, ContentFeatures, CtaType};

    fn touch(i: usize, cta: CtaType, converted: bool) -> Touch {
        Touch {
            id: format!("t{i}"),
            lead_id: format!("l{i}"),
            client_id: "acme".into(),
            channel: Channel::Email,
            occurred_at: Utc::now(),
            features: ContentFeatures {
                cta_type: Some(cta),
                has_question: Some(i % 2 == 0),
                ..ContentFeatures::default()
            },
            converted_credit: converted,
        }
    }

    #[test]
    fn meeting_cta_surfaces_with_positive_lift() {
        // meeting converts at 40%, reply at 4%
        let mut touches = Vec::new();
        for i in 0..50 {
            touches.push(touch(i, CtaType::Meeting, i % 5 < 2));
        }
        for i in 50..100 {
            touches.push(touch(i, CtaType::Reply, i % 25 == 0));
        }

        let pattern = detect(
            &Scope::Client("acme".into()),
            &touches,
            &LearningConfig::default(),
            Utc::now(),
        )
        .expect("pattern");
        let PatternPayload::What(what) = &pattern.payload else {
            panic!("expected what payload");
        };

        assert_eq!(pattern.sample_size, 100);
        assert_eq!(what.entries[0].feature, "cta_type=meeting");
        assert!(what.entries[0].lift > 1.5);
        let reply = what
            .entries
            .iter()
            .find(|e| e.feature == "cta_type=reply")
            .unwrap();
        assert!(reply.lift < 1.0);
    }

    #[test]
    fn below_gate_returns_none() {
        let touches: Vec<_> = (0..29).map(|i| touch(i, CtaType::Link, false)).collect();
        assert!(detect(
            &Scope::Platform,
            &touches,
            &LearningConfig::default(),
            Utc::now()
        )
        .is_none());
    }

    #[test]
    fn zero_conversions_yield_no_pattern() {
        let touches: Vec<_> = (0..60).map(|i| touch(i, CtaType::Link, false)).collect();
        assert!(detect(
            &Scope::Platform,
            &touches,
            &LearningConfig::default(),
            Utc::now()
        )
        .is_none());
    }

    #[test]
    fn absent_features_contribute_nothing() {
        let mut touches: Vec<_> = (0..60).map(|i| touch(i, CtaType::Meeting, i % 4 == 0)).collect();
        for t in &mut touches {
            t.features = ContentFeatures::default();
        }
        // Every bucket is empty, so nothing survives even above the gate.
        assert!(detect(
            &Scope::Platform,
            &touches,
            &LearningConfig::default(),
            Utc::now()
        )
        .is_none());
    }
}
