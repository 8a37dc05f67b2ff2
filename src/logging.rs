//! Logging setup for processes embedding the provider core.
//!
//! Output goes to **stderr**; stdout belongs to the plugin host. The filter
//! is read from `BRAINTRUST_PROVIDER_LOG` first, then `RUST_LOG`, then the
//! supplied default.
//!
//! ```bash
//! # Reconciler decisions
//! BRAINTRUST_PROVIDER_LOG=braintrust_provider_core=debug ./provider
//!
//! # Everything at trace
//! RUST_LOG=trace ./provider
//! ```

use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Provider-specific filter variable, consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "BRAINTRUST_PROVIDER_LOG";

/// Level used when neither variable is set.
pub const DEFAULT_LEVEL: &str = "info";

/// Build the filter: `BRAINTRUST_PROVIDER_LOG`, else `RUST_LOG`, else `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(default_level: &str) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(env_filter(default_level)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the global subscriber at the default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Install the global subscriber with a custom default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Install the global subscriber unless one is already set.
///
/// Returns `false` if a subscriber was already installed.
pub fn try_init_logging() -> bool {
    subscriber(DEFAULT_LEVEL).try_init().is_ok()
}
