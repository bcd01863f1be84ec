use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_WEIGHT, MIN_WEIGHT, WEIGHT_SUM_TOLERANCE};

/// The five independent sub-scores produced by the external scoring pipeline.
/// Each is bounded to [0, 100]; this subsystem only ever reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub data_quality: f64,
    pub authority: f64,
    pub company_fit: f64,
    pub timing: f64,
    pub risk: f64,
}

impl ScoreComponents {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.data_quality,
            self.authority,
            self.company_fit,
            self.timing,
            self.risk,
        ]
    }
}

/// Names the five components, in the same order as `as_array`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    DataQuality,
    Authority,
    CompanyFit,
    Timing,
    Risk,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::DataQuality,
        ComponentKind::Authority,
        ComponentKind::CompanyFit,
        ComponentKind::Timing,
        ComponentKind::Risk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::DataQuality => "data_quality",
            ComponentKind::Authority => "authority",
            ComponentKind::CompanyFit => "company_fit",
            ComponentKind::Timing => "timing",
            ComponentKind::Risk => "risk",
        }
    }
}

/// Normalized weight vector over the five score components.
///
/// Invariants for any persisted vector: each component within
/// [`MIN_WEIGHT`, `MAX_WEIGHT`] and the sum equal to 1.0 within
/// [`WEIGHT_SUM_TOLERANCE`]. The bounds prevent degenerate all-or-nothing
/// solutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub data_quality: f64,
    pub authority: f64,
    pub company_fit: f64,
    pub timing: f64,
    pub risk: f64,
}

/// Static industry-benchmark weights, used when no learned pattern qualifies.
pub const PLATFORM_PRIORS: WeightVector = WeightVector {
    data_quality: 0.20,
    authority: 0.25,
    company_fit: 0.25,
    timing: 0.15,
    risk: 0.15,
};

/// Last-resort weights, never absent.
pub const HARDCODED_DEFAULT: WeightVector = WeightVector {
    data_quality: 0.20,
    authority: 0.20,
    company_fit: 0.20,
    timing: 0.20,
    risk: 0.20,
};

impl WeightVector {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.data_quality,
            self.authority,
            self.company_fit,
            self.timing,
            self.risk,
        ]
    }

    pub fn from_array(w: [f64; 5]) -> Self {
        Self {
            data_quality: w[0],
            authority: w[1],
            company_fit: w[2],
            timing: w[3],
            risk: w[4],
        }
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Weighted composite score for a lead.
    pub fn composite(&self, components: &ScoreComponents) -> f64 {
        self.as_array()
            .iter()
            .zip(components.as_array().iter())
            .map(|(w, c)| w * c)
            .sum()
    }

    /// Whether this vector satisfies the persistence invariants.
    pub fn is_valid(&self) -> bool {
        let arr = self.as_array();
        let bounded = arr
            .iter()
            .all(|w| w.is_finite() && *w >= MIN_WEIGHT - 1e-12 && *w <= MAX_WEIGHT + 1e-12);
        bounded && (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

/// Provenance label for resolved weights, reported alongside them so the
/// scoring consumer can surface which fallback tier was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    ClientLearned,
    IndustryLearned,
    PlatformLearned,
    StaticPriors,
    HardcodedDefault,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::ClientLearned => "client_learned",
            SourceTag::IndustryLearned => "industry_learned",
            SourceTag::PlatformLearned => "platform_learned",
            SourceTag::StaticPriors => "static_priors",
            SourceTag::HardcodedDefault => "hardcoded_default",
        }
    }
}

/// The weight resolver's answer: weights plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWeights {
    pub weights: WeightVector,
    pub source: SourceTag,
    /// `computed_at` of the learned pattern that supplied the weights;
    /// `None` for priors and defaults.
    pub computed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priors_and_default_are_valid() {
        assert!(PLATFORM_PRIORS.is_valid());
        assert!(HARDCODED_DEFAULT.is_valid());
    }

    #[test]
    fn sum_and_composite() {
        let w = HARDCODED_DEFAULT;
        assert!((w.sum() - 1.0).abs() < 1e-12);
        let c = ScoreComponents {
            data_quality: 50.0,
            authority: 50.0,
            company_fit: 50.0,
            timing: 50.0,
            risk: 50.0,
        };
        assert!((w.composite(&c) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_vector_is_invalid() {
        let w = WeightVector::from_array([0.50, 0.20, 0.10, 0.10, 0.10]);
        assert!(!w.is_valid());
        let w = WeightVector::from_array([0.01, 0.29, 0.30, 0.20, 0.20]);
        assert!(!w.is_valid());
    }

    #[test]
    fn sum_off_by_more_than_tolerance_is_invalid() {
        let w = WeightVector::from_array([0.20, 0.20, 0.20, 0.20, 0.21]);
        assert!(!w.is_valid());
    }

    #[test]
    fn source_tag_strings() {
        assert_eq!(SourceTag::ClientLearned.as_str(), "client_learned");
        assert_eq!(SourceTag::StaticPriors.as_str(), "static_priors");
    }
}
