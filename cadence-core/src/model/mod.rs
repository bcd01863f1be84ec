//! Domain model: touches, score components, patterns, scopes.

mod pattern;
mod scope;
mod scores;
mod touch;
mod window;

pub use pattern::{
    AttributeBucket, FeatureLift, HowPayload, Pattern, PatternPayload, PatternType, SequenceLift,
    Tercile, TimeSlotLift, WhatPayload, WhenPayload, WhoPayload,
};
pub use scope::Scope;
pub use scores::{
    ComponentKind, ResolvedWeights, ScoreComponents, SourceTag, WeightVector, HARDCODED_DEFAULT,
    PLATFORM_PRIORS,
};
pub use touch::{
    AttributionMethod, Channel, ContentFeatures, ConversionEvent, CtaType, LeadOutcome,
    SubjectLengthBucket, Touch,
};
pub use window::TrailingWindow;
