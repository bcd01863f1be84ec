//! Default values backing the config structs.

/// Trailing observation window for the weekly learning job (days).
pub const DEFAULT_WINDOW_DAYS: u32 = 180;

/// Pattern validity horizon after `computed_at` (days).
pub const DEFAULT_VALIDITY_DAYS: u32 = 14;

/// Optimizer iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Initial mass-transfer step for the optimizer.
pub const DEFAULT_INITIAL_STEP: f64 = 0.05;

/// Step size below which the optimizer declares convergence.
pub const DEFAULT_MIN_STEP: f64 = 1e-4;

/// Interval between weekly learning runs (seconds).
pub const DEFAULT_WEEKLY_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Interval between daily health runs (seconds).
pub const DEFAULT_DAILY_INTERVAL_SECS: u64 = 24 * 3600;

/// Bounded retry count for one scope's batch unit.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Initial retry backoff (milliseconds); doubles per attempt.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 50;

/// Worker threads draining the per-scope work queue.
pub const DEFAULT_WORKERS: usize = 4;
