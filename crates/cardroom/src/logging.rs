//! Tracing initialisation.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber: `RUST_LOG`-style filtering and
/// human-readable output with targets.
///
/// Does nothing if a subscriber is already installed, so tests can call
/// it freely.
pub fn init() {
    if try_init().is_ok() {
        tracing::debug!("logging initialised");
    }
}

/// Like [`init`], but reports whether a subscriber was already set.
pub fn try_init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
        assert!(try_init().is_err());
    }
}
