//! Diagnostic logging.
//!
//! User-facing progress goes through [`progress`](crate::progress); this
//! sets up `tracing` for diagnostics on stderr. The filter comes from the
//! `CAPSYNC_LOG` environment variable, e.g. `CAPSYNC_LOG=capture_sync=debug`,
//! falling back to warnings only.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "CAPSYNC_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("capture_sync=warn"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
