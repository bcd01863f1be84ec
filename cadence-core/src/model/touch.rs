use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outreach channel a touch was delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Voice,
    Linkedin,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Voice => "voice",
            Channel::Linkedin => "linkedin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Channel::Email),
            "sms" => Some(Channel::Sms),
            "voice" => Some(Channel::Voice),
            "linkedin" => Some(Channel::Linkedin),
            _ => None,
        }
    }
}

/// Subject-length bucket assigned by the sending channel engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectLengthBucket {
    Short,
    Medium,
    Long,
}

impl SubjectLengthBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectLengthBucket::Short => "short",
            SubjectLengthBucket::Medium => "medium",
            SubjectLengthBucket::Long => "long",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "short" => Some(SubjectLengthBucket::Short),
            "medium" => Some(SubjectLengthBucket::Medium),
            "long" => Some(SubjectLengthBucket::Long),
            _ => None,
        }
    }
}

/// Call-to-action type of the message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaType {
    Meeting,
    Reply,
    Link,
    None,
}

impl CtaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CtaType::Meeting => "meeting",
            CtaType::Reply => "reply",
            CtaType::Link => "link",
            CtaType::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meeting" => Some(CtaType::Meeting),
            "reply" => Some(CtaType::Reply),
            "link" => Some(CtaType::Link),
            "none" => Some(CtaType::None),
            _ => None,
        }
    }
}

/// Normalized content/timing features on a touch.
///
/// Every field is optional: the channel engine that wrote the touch is
/// responsible for populating the vocabulary, and a missing field means
/// "excluded from that dimension's analysis", never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFeatures {
    pub pain_point_mentioned: Option<bool>,
    pub subject_length_bucket: Option<SubjectLengthBucket>,
    pub has_question: Option<bool>,
    pub cta_type: Option<CtaType>,
    pub personalization_used: Option<bool>,
    /// Recipient-local hour of delivery, 0–23.
    pub recipient_local_hour: Option<u8>,
    /// Recipient-local weekday of delivery, 0–6 (Monday = 0).
    pub recipient_local_weekday: Option<u8>,
}

/// A sent touch, read-only input from the Outcome Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub id: String,
    pub lead_id: String,
    pub client_id: String,
    pub channel: Channel,
    pub occurred_at: DateTime<Utc>,
    pub features: ContentFeatures,
    /// Set exactly once per lead by the external conversion marker;
    /// immutable once true.
    pub converted_credit: bool,
}

/// How the external marker attributed a conversion to a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMethod {
    FirstTouch,
    LastTouch,
    External,
}

impl AttributionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionMethod::FirstTouch => "first_touch",
            AttributionMethod::LastTouch => "last_touch",
            AttributionMethod::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first_touch" => Some(AttributionMethod::FirstTouch),
            "last_touch" => Some(AttributionMethod::LastTouch),
            "external" => Some(AttributionMethod::External),
            _ => None,
        }
    }
}

/// Append-only ledger entry marking a lead's single credited conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    pub lead_id: String,
    pub touch_id: String,
    pub method: AttributionMethod,
    pub credited_at: DateTime<Utc>,
}

/// Per-lead (score components, outcome) pair consumed by the WHO detector.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadOutcome {
    pub lead_id: String,
    pub components: super::ScoreComponents,
    pub converted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_roundtrip() {
        for ch in [Channel::Email, Channel::Sms, Channel::Voice, Channel::Linkedin] {
            assert_eq!(Channel::parse(ch.as_str()), Some(ch));
        }
        assert_eq!(Channel::parse("fax"), None);
    }

    #[test]
    fn features_default_to_absent() {
        let f = ContentFeatures::default();
        assert!(f.pain_point_mentioned.is_none());
        assert!(f.recipient_local_hour.is_none());
    }

    #[test]
    fn attribution_roundtrip() {
        for m in [
            AttributionMethod::FirstTouch,
            AttributionMethod::LastTouch,
            AttributionMethod::External,
        ] {
            assert_eq!(AttributionMethod::parse(m.as_str()), Some(m));
        }
    }
}
