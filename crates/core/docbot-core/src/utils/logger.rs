//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor `DOCBOT_LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Filter from `RUST_LOG`, else `DOCBOT_LOG_LEVEL`, else `fallback`
pub fn env_filter(fallback: &str) -> EnvFilter {
    let level = std::env::var("DOCBOT_LOG_LEVEL").unwrap_or_else(|_| fallback.to_string());
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber; returns `false` if one is already set
pub fn try_init_logging(fallback: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(fallback))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// Initialize the global logging system
pub fn init_logging() {
    if !try_init_logging(DEFAULT_LOG_LEVEL) {
        tracing::debug!("Logging already initialized");
    }
}
