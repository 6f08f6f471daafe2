//! Console logging on top of `tracing`
//!
//! Progress and diagnostics go to stderr so stdout stays clean for tables and
//! JSON. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn default_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub(crate) fn init_logging(debug: bool, use_color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
