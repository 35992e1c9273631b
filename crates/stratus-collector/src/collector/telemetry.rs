//! Tracing-based structured logging initialization.
//!
//! Events go to stderr: stdout is reserved for the envelope stream, so the
//! collector stays usable in shell pipelines even with verbose logging
//! enabled.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. With `json_logs`
/// set, events are emitted as single-line JSON objects for log shippers;
/// otherwise a human-readable format with RFC 3339 timestamps is used.
pub fn init_telemetry(json_logs: bool) {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    if json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(fmt::time::ChronoLocal::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
