/// Cadence system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum distinct leads before a WHO pattern may be written.
pub const MIN_WHO_SAMPLE_SIZE: u64 = 50;

/// Minimum eligible observations before a WHAT/WHEN/HOW pattern may be written.
pub const MIN_LIFT_SAMPLE_SIZE: u64 = 30;

/// Minimum observations within a single bucket for it to appear in a lift table.
pub const MIN_BUCKET_SAMPLE: u64 = 10;

/// Maximum ranked entries retained in a WHAT/HOW payload.
pub const TOP_N_LIFT_ENTRIES: usize = 10;

/// Maximum best/worst time slots retained in a WHEN payload.
pub const TOP_N_TIME_SLOTS: usize = 5;

/// Maximum channel-sequence length considered by the HOW detector.
pub const MAX_SEQUENCE_LEN: usize = 5;

/// Lower bound on any single weight component.
pub const MIN_WEIGHT: f64 = 0.05;

/// Upper bound on any single weight component.
pub const MAX_WEIGHT: f64 = 0.40;

/// Tolerance on the weight-vector sum invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Confidence gate for client-scoped weight resolution.
pub const CLIENT_CONFIDENCE_GATE: f64 = 0.7;

/// Confidence gate for industry-scoped weight resolution.
pub const INDUSTRY_CONFIDENCE_GATE: f64 = 0.6;

/// Confidence gate for platform-scoped weight resolution.
pub const PLATFORM_CONFIDENCE_GATE: f64 = 0.5;

/// Sample-size gate for client-scoped weight resolution.
pub const CLIENT_SAMPLE_GATE: u64 = 50;

/// One in HOLDOUT_MODULUS leads lands in the held-out confidence split.
pub const HOLDOUT_MODULUS: u8 = 5;

/// Minimum held-out leads before the held-out estimate is trusted over
/// the full-sample estimate.
pub const MIN_HOLDOUT_SAMPLE: usize = 10;
