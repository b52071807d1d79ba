//! Tracing subscriber setup shared by the binaries.

use crate::config::LogFormat;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` directives win over the `info` default.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Level::INFO.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .pretty(),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .flatten_event(true),
            )
            .init(),
    }
}
