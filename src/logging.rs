use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "warn";

/// Initialize tracing for applications embedding this crate.
///
/// Honours `RUST_LOG`; conversion and query operations log under the
/// `tableau_data` target at `debug`/`trace`. Calling this more than once is
/// harmless, later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Same as `init_tracing` but at a fixed level, for tests that want to see
/// the crate's debug output
pub fn init_test_tracing(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .try_init();
}
