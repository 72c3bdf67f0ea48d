//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_FILTER: &str = "jenkins_relay=info";

/// Picks the filter directive: `RUST_LOG`, then the CLI level, then the default.
pub fn filter_directive(rust_log: Option<&str>, cli_level: Option<&str>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .or(cli_level)
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Installs the global subscriber.
pub fn init(cli_level: Option<&str>) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(rust_log.as_deref(), cli_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
