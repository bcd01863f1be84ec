//! WHEN detector: recipient-local send slots that lift conversion.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use cadence_core::config::LearningConfig;
use cadence_core::constants::{MIN_LIFT_SAMPLE_SIZE, TOP_N_TIME_SLOTS};
use cadence_core::model::{
    Pattern, PatternPayload, PatternType, Scope, TimeSlotLift, Touch, WhenPayload,
};

use crate::confidence::convergence_factor;
use crate::lift::{ranked_lifts, BucketCounts};

/// Detect the WHEN pattern for one scope from its touches.
///
/// A touch is eligible only when both recipient-local fields are present.
/// Slots are (weekday, four-hour block); best and worst slots are reported
/// separately so a consumer can both target and avoid.
pub fn detect(
    scope: &Scope,
    touches: &[Touch],
    config: &LearningConfig,
    now: DateTime<Utc>,
) -> Option<Pattern> {
    let eligible: Vec<&Touch> = touches
        .iter()
        .filter(|t| {
            t.features.recipient_local_weekday.is_some()
                && t.features.recipient_local_hour.is_some()
        })
        .collect();
    if (eligible.len() as u64) < MIN_LIFT_SAMPLE_SIZE {
        tracing::debug!(
            scope = %scope.key(),
            eligible = eligible.len(),
            "insufficient timestamped touches for when detection"
        );
        return None;
    }

    let converted = eligible.iter().filter(|t| t.converted_credit).count() as u64;
    let baseline = converted as f64 / eligible.len() as f64;

    let mut buckets: BTreeMap<(u8, u8), BucketCounts> = BTreeMap::new();
    for touch in &eligible {
        let weekday = touch.features.recipient_local_weekday.unwrap_or(0);
        let hour = touch.features.recipient_local_hour.unwrap_or(0);
        buckets
            .entry((weekday, hour / 4))
            .or_default()
            .observe(touch.converted_credit);
    }

    let ranked = ranked_lifts(&buckets, baseline);
    if ranked.is_empty() {
        return None;
    }

    let slot = |e: &crate::lift::LiftEntry<(u8, u8)>| TimeSlotLift {
        weekday: e.key.0,
        hour_block: e.key.1,
        lift: e.lift,
        sample_size: e.sample_size,
    };
    let best: Vec<TimeSlotLift> = ranked.iter().take(TOP_N_TIME_SLOTS).map(slot).collect();
    let worst: Vec<TimeSlotLift> = ranked
        .iter()
        .rev()
        .take(TOP_N_TIME_SLOTS)
        .map(slot)
        .collect();

    Some(Pattern {
        scope: scope.clone(),
        pattern_type: PatternType::When,
        payload: PatternPayload::When(WhenPayload {
            baseline_rate: baseline,
            best,
            worst,
        }),
        sample_size: eligible.len() as u64,
        confidence: convergence_factor(converted, eligible.len() as u64),
        computed_at: now,
        valid_until: now + Duration::days(i64::from(config.validity_days)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::model::{Channel, ContentFeatures};

    fn touch(i: usize, weekday: u8, hour: u8, converted: bool) -> Touch {
        Touch {
            id: format!("t{i}"),
            lead_id: format!("l{i}"),
            client_id: "acme".into(),
            channel: Channel::Email,
            occurred_at: Utc::now(),
            features: ContentFeatures {
                recipient_local_weekday: Some(weekday),
                recipient_local_hour: Some(hour),
                ..ContentFeatures::default()
            },
            converted_credit: converted,
        }
    }

    #[test]
    fn morning_slot_beats_evening_slot() {
        let mut touches = Vec::new();
        // Tuesday 08-12 converts at 30%
        for i in 0..40 {
            touches.push(touch(i, 1, 9, i % 10 < 3));
        }
        // Friday 16-20 converts at 5%
        for i in 40..80 {
            touches.push(touch(i, 4, 17, i % 20 == 0));
        }

        let pattern = detect(
            &Scope::Industry("saas".into()),
            &touches,
            &LearningConfig::default(),
            Utc::now(),
        )
        .expect("pattern");
        let PatternPayload::When(when) = &pattern.payload else {
            panic!("expected when payload");
        };

        assert_eq!((when.best[0].weekday, when.best[0].hour_block), (1, 2));
        assert!(when.best[0].lift > 1.0);
        assert_eq!((when.worst[0].weekday, when.worst[0].hour_block), (4, 4));
        assert!(when.worst[0].lift < 1.0);
    }

    #[test]
    fn touches_without_local_time_are_excluded() {
        let mut touches: Vec<_> = (0..40).map(|i| touch(i, 1, 9, i % 4 == 0)).collect();
        for t in touches.iter_mut().take(15) {
            t.features.recipient_local_hour = None;
        }
        // 25 eligible touches, below the gate.
        assert!(detect(
            &Scope::Platform,
            &touches,
            &LearningConfig::default(),
            Utc::now()
        )
        .is_none());
    }

    #[test]
    fn best_and_worst_are_capped() {
        let mut touches = Vec::new();
        let mut id = 0;
        for weekday in 0..7u8 {
            for block in 0..6u8 {
                for j in 0..12 {
                    touches.push(touch(id, weekday, block * 4, j < weekday as usize));
                    id += 1;
                }
            }
        }
        let pattern = detect(
            &Scope::Platform,
            &touches,
            &LearningConfig::default(),
            Utc::now(),
        )
        .expect("pattern");
        let PatternPayload::When(when) = &pattern.payload else {
            panic!("expected when payload");
        };
        assert_eq!(when.best.len(), 5);
        assert_eq!(when.worst.len(), 5);
        assert!(when.best[0].lift >= when.worst[0].lift);
    }
}
