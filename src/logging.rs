//! Tracing setup for the CLI.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Install the global subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Logs go to stderr so command output on stdout stays clean. Calling this
/// more than once is a no-op.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
