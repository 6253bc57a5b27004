//! Opt-in diagnostics.
//!
//! Nothing is installed unless `JINX_LOG` is set, so hosts that bring their
//! own `tracing` subscriber are left alone. The filter syntax is that of
//! `RUST_LOG` (e.g. `JINX_LOG=jinx_env=debug`).

use std::sync::Once;

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "JINX_LOG";

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `JINX_LOG`.
///
/// Runs at most once per process. Does nothing if the variable is unset or
/// another global subscriber is already installed.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
            let installed = tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .try_init()
                .is_ok();
            tracing::debug!(installed, "tracing initialized");
        }
    });
}

/// C entry point for [`init_tracing`].
#[no_mangle]
pub extern "C" fn jx_init_tracing() {
    init_tracing();
}
