//! Diagnostic logging
//!
//! Diagnostics go to stderr through `tracing` and never mix with command
//! output on stdout. `RUST_LOG` overrides the default filter.

use std::io;
use tracing_subscriber::{EnvFilter, fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a run
pub fn default_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "warn" };
    format!("warn,knex_cli={}", level)
}

/// Install the global subscriber
///
/// Safe to call more than once; only the first call takes effect.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            Layer::new()
                .with_writer(io::stderr)
                .with_target(verbose)
                .without_time(),
        )
        .try_init();

    if result.is_ok() {
        tracing::debug!(verbose, "logging initialized");
    }
}
