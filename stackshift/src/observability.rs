//! Tracing subscriber setup for embedders.

use tracing_subscriber::EnvFilter;

/// Initializes a formatted tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, falling back to the given
/// default directive. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
