//! Logging configuration using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// Diagnostics go to stderr so they never mix with command output on
/// stdout. The default level follows the `-v` count; the `MSENSE_LOG`
/// environment variable overrides it.
///
/// # Examples
/// ```bash
/// MSENSE_LOG=debug msense update
/// MSENSE_LOG=msense_build=trace msense show
/// ```
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Default from the -v count, allow override via MSENSE_LOG
    let env_filter = EnvFilter::try_from_env("MSENSE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}
