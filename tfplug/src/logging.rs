//! Logging setup for provider processes
//!
//! Logs go to stderr because stdout belongs to the plugin protocol.
//! Filtering follows `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Returns `false` when one is already
/// installed, so embedders and tests can call it more than once.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected_without_panicking() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}
