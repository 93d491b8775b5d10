use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Build the filter: `RUST_LOG` wins, then `cfg.level`, then `info`.
#[must_use]
pub fn build_env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global `tracing` subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging(cfg: &LoggingConfig) {
    let filter = build_env_filter(cfg);

    let result = match cfg.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(cfg.ansi)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Global tracing subscriber already installed");
    }
}
