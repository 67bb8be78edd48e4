//! Structured logging using **tracing**.
//!
//! The library only emits events; the binary installs a subscriber once at
//! startup. All output goes to stderr so stdout stays clean for reports.

use tracing_subscriber::EnvFilter;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event, for log collectors
    Json,
}

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initializes the global tracing subscriber.
///
/// Call once at the beginning of the program. A second call (or a
/// subscriber installed elsewhere, as in tests) is ignored.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=hiergraph_core=debug`)
pub fn init_logging(format: LogFormat) {
    let result = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .with_current_span(true)
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "logging already initialized");
    }
}
