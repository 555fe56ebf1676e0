//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "docsift=debug"
    } else {
        "docsift=info"
    }
}

/// Installs a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`. With `json` set, events are
/// written as one JSON object per line. Calling this twice is harmless; the
/// first subscriber stays installed.
pub fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Err only means a subscriber is already installed.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "docsift=info");
        assert_eq!(default_filter(true), "docsift=debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(false, false);
        init_tracing(true, true);
        tracing::info!("still logging");
    }
}
