//! Deterministic synthetic outcome data for integration tests.
//!
//! Every builder takes an explicit seed and clock, so a scenario is
//! byte-reproducible across runs and machines.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cadence_core::model::{
    AttributionMethod, Channel, ContentFeatures, ConversionEvent, CtaType, ScoreComponents,
    SubjectLengthBucket, Touch,
};

/// A fully seeded client history: touches, per-lead score components, and
/// the conversion ledger.
#[derive(Debug, Clone)]
pub struct ClientScenario {
    pub client_id: String,
    pub industry: String,
    pub touches: Vec<Touch>,
    /// (lead_id, components) pairs, one per lead.
    pub components: Vec<(String, ScoreComponents)>,
    pub conversions: Vec<ConversionEvent>,
}

/// Build a client history where conversion is driven by `authority` and
/// `company_fit`, sent on an email-then-voice cadence.
///
/// Converted leads score high on the driving components, are touched on
/// Tuesday mornings with a meeting ask, and are credited on the voice
/// touch. Non-converted leads score low, land on Friday evenings, and ask
/// for a reply. The separation is strong enough for the WHO optimizer to
/// find and for every lift detector to clear its gates at realistic sizes.
pub fn conversion_scenario(
    client_id: &str,
    industry: &str,
    leads: usize,
    conversions: usize,
    seed: u64,
    now: DateTime<Utc>,
) -> ClientScenario {
    assert!(conversions <= leads, "more conversions than leads");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut touches = Vec::with_capacity(leads * 2);
    let mut components = Vec::with_capacity(leads);
    let mut ledger = Vec::with_capacity(conversions);

    for i in 0..leads {
        let converted = i < conversions;
        let lead_id = format!("{client_id}-lead-{i:04}");
        components.push((lead_id.clone(), lead_components(&mut rng, converted)));

        let first_at = now - Duration::days(40) + Duration::hours(i as i64 % 300);
        let (weekday, hour, cta, pain) = if converted {
            (1, 9, CtaType::Meeting, true)
        } else {
            (4, 17, CtaType::Reply, false)
        };
        let features = ContentFeatures {
            pain_point_mentioned: Some(pain),
            subject_length_bucket: Some(SubjectLengthBucket::Short),
            has_question: Some(rng.gen_bool(0.5)),
            cta_type: Some(cta),
            personalization_used: Some(converted),
            recipient_local_hour: Some(hour),
            recipient_local_weekday: Some(weekday),
        };

        let email_id = format!("{lead_id}-t0");
        let voice_id = format!("{lead_id}-t1");
        touches.push(Touch {
            id: email_id,
            lead_id: lead_id.clone(),
            client_id: client_id.to_string(),
            channel: Channel::Email,
            occurred_at: first_at,
            features: features.clone(),
            converted_credit: false,
        });
        touches.push(Touch {
            id: voice_id.clone(),
            lead_id: lead_id.clone(),
            client_id: client_id.to_string(),
            channel: Channel::Voice,
            occurred_at: first_at + Duration::days(2),
            features,
            converted_credit: false,
        });

        if converted {
            ledger.push(ConversionEvent {
                lead_id,
                touch_id: voice_id,
                method: AttributionMethod::LastTouch,
                credited_at: first_at + Duration::days(2) + Duration::hours(4),
            });
        }
    }

    ClientScenario {
        client_id: client_id.to_string(),
        industry: industry.to_string(),
        touches,
        components,
        conversions: ledger,
    }
}

fn lead_components(rng: &mut StdRng, converted: bool) -> ScoreComponents {
    let noise = |rng: &mut StdRng| rng.gen_range(-5.0f64..5.0);
    let (authority, company_fit) = if converted { (78.0, 72.0) } else { (28.0, 32.0) };
    ScoreComponents {
        data_quality: (55.0 + noise(rng)).clamp(0.0, 100.0),
        authority: (authority + noise(rng)).clamp(0.0, 100.0),
        company_fit: (company_fit + noise(rng)).clamp(0.0, 100.0),
        timing: (50.0 + noise(rng)).clamp(0.0, 100.0),
        risk: (45.0 + noise(rng)).clamp(0.0, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_is_reproducible() {
        let now = Utc::now();
        let a = conversion_scenario("acme", "saas", 120, 40, 7, now);
        let b = conversion_scenario("acme", "saas", 120, 40, 7, now);
        assert_eq!(a.touches, b.touches);
        assert_eq!(a.components, b.components);
        assert_eq!(a.conversions, b.conversions);
    }

    #[test]
    fn counts_line_up() {
        let scenario = conversion_scenario("acme", "saas", 120, 40, 7, Utc::now());
        assert_eq!(scenario.components.len(), 120);
        assert_eq!(scenario.touches.len(), 240);
        assert_eq!(scenario.conversions.len(), 40);
    }

    #[test]
    fn components_stay_within_score_bounds() {
        let scenario = conversion_scenario("acme", "saas", 200, 60, 3, Utc::now());
        for (_, components) in &scenario.components {
            for value in components.as_array() {
                assert!((0.0..=100.0).contains(&value), "value = {value}");
            }
        }
    }

    #[test]
    fn converted_leads_separate_on_authority() {
        let scenario = conversion_scenario("acme", "saas", 100, 30, 11, Utc::now());
        let (converted, rest) = scenario.components.split_at(30);
        let avg = |slice: &[(String, ScoreComponents)]| {
            slice.iter().map(|(_, c)| c.authority).sum::<f64>() / slice.len() as f64
        };
        assert!(avg(converted) - avg(rest) > 30.0);
    }
}
