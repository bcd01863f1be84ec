//! Tracing setup for batch runs.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `CADENCE_LOG` environment variable for filtering and
/// defaults to `info`. Call once at process start; embedding hosts that
/// already installed a subscriber should skip this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("CADENCE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    subscriber(filter).init();
}

fn subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish()
}
