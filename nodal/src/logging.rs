//! Diagnostic logging for the CLI.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging based on the `$RUST_LOG` environment variable.
///
/// Engine fault reports are `warn` events and node mutations are `debug`
/// events, so `RUST_LOG=nodal_core=debug` traces everything a command does.
pub fn set_up_logging() {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_ansi(should_emit_colors())
        .with_writer(std::io::stderr)
        .compact();

    let filter_layer = EnvFilter::builder().from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// Check whether we should emit ANSI escape codes for log formatting.
fn should_emit_colors() -> bool {
    atty::is(atty::Stream::Stderr) && std::env::var_os("NO_COLOR").is_none()
}
