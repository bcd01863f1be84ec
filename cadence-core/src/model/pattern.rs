use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scope::Scope;
use super::scores::{ComponentKind, WeightVector};
use super::touch::Channel;
use crate::constants::{MIN_LIFT_SAMPLE_SIZE, MIN_WHO_SAMPLE_SIZE};
use crate::errors::CadenceResult;

/// The four pattern dimensions derived from historical outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Who,
    What,
    When,
    How,
}

impl PatternType {
    pub const ALL: [PatternType; 4] = [
        PatternType::Who,
        PatternType::What,
        PatternType::When,
        PatternType::How,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Who => "who",
            PatternType::What => "what",
            PatternType::When => "when",
            PatternType::How => "how",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "who" => Some(PatternType::Who),
            "what" => Some(PatternType::What),
            "when" => Some(PatternType::When),
            "how" => Some(PatternType::How),
            _ => None,
        }
    }

    /// Hard admission gate: a pattern below this sample size is never
    /// persisted.
    pub fn min_sample_size(&self) -> u64 {
        match self {
            PatternType::Who => MIN_WHO_SAMPLE_SIZE,
            _ => MIN_LIFT_SAMPLE_SIZE,
        }
    }
}

/// Score-component tercile used for attribute-bucketed conversion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tercile {
    Low,
    Mid,
    High,
}

/// Conversion rate for one (component, tercile) attribute bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeBucket {
    pub component: ComponentKind,
    pub bucket: Tercile,
    pub conversion_rate: f64,
    pub sample_size: u64,
}

/// WHO payload: the optimized weight vector plus the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoPayload {
    pub weights: WeightVector,
    /// Predictive metric of the static prior vector over the same data,
    /// so the lift of learning is measured against a fixed yardstick.
    pub baseline_correlation: f64,
    /// Predictive metric of the optimized vector.
    pub optimized_correlation: f64,
    /// False when the optimizer fell back to the initial vector.
    pub converged: bool,
    pub buckets: Vec<AttributeBucket>,
}

/// One ranked content-feature lift entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLift {
    /// Normalized feature key, e.g. `cta_type=meeting`.
    pub feature: String,
    pub lift: f64,
    pub conversion_rate: f64,
    pub sample_size: u64,
}

/// WHAT payload: ranked content-feature lifts against the scope baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatPayload {
    pub baseline_rate: f64,
    pub entries: Vec<FeatureLift>,
}

/// One recipient-local time slot and its lift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotLift {
    /// Recipient-local weekday, 0–6 (Monday = 0).
    pub weekday: u8,
    /// Four-hour block of the recipient-local day, 0–5.
    pub hour_block: u8,
    pub lift: f64,
    pub sample_size: u64,
}

/// WHEN payload: best and worst recipient-local time slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenPayload {
    pub baseline_rate: f64,
    pub best: Vec<TimeSlotLift>,
    pub worst: Vec<TimeSlotLift>,
}

/// One ranked pre-conversion channel sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceLift {
    pub channels: Vec<Channel>,
    pub lift: f64,
    pub sample_size: u64,
}

/// HOW payload: ranked channel sequences against the scope baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HowPayload {
    pub baseline_rate: f64,
    pub sequences: Vec<SequenceLift>,
}

/// Typed pattern payload — one case per pattern type, serialized as a
/// tagged enum so each consumer gets compile-time shape guarantees instead
/// of runtime key lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum PatternPayload {
    Who(WhoPayload),
    What(WhatPayload),
    When(WhenPayload),
    How(HowPayload),
}

impl PatternPayload {
    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternPayload::Who(_) => PatternType::Who,
            PatternPayload::What(_) => PatternType::What,
            PatternPayload::When(_) => PatternType::When,
            PatternPayload::How(_) => PatternType::How,
        }
    }
}

/// A versioned, scope-keyed statistical artifact derived from historical
/// outcomes. Created only by the batch orchestrator; superseded, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub scope: Scope,
    pub pattern_type: PatternType,
    pub payload: PatternPayload,
    pub sample_size: u64,
    /// Internal statistical reliability of the computation, in [0, 1].
    /// Independent of `sample_size`, which is the admission gate.
    pub confidence: f64,
    pub computed_at: DateTime<Utc>,
    /// After this instant the pattern is inactive for resolution even if it
    /// is still the latest row.
    pub valid_until: DateTime<Utc>,
}

impl Pattern {
    /// Expiry is the resolver's concern; the store never evaluates it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }

    /// Whether the payload case matches the declared pattern type.
    pub fn payload_matches_type(&self) -> bool {
        self.payload.pattern_type() == self.pattern_type
    }

    /// blake3 hash of the serialized payload, for idempotence checks and
    /// audit trails.
    pub fn payload_hash(&self) -> CadenceResult<String> {
        let serialized = serde_json::to_string(&self.payload)?;
        Ok(blake3::hash(serialized.as_bytes()).to_hex().to_string())
    }
}
