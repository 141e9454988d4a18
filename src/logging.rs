use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, TAGS_ENV};

/// Install the global tracing subscriber.
///
/// Filter comes from `RUST_LOG`, falling back to the configured filter.
/// Use RUST_LOG=debug for per-call tag logs. Calling this twice is harmless.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.log_filter)
            .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Some(raw) = &config.rejected_tag_mode {
        tracing::warn!(
            value = %raw,
            "Unrecognized {} value, using auto",
            TAGS_ENV
        );
    }
}
