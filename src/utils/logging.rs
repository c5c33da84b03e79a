use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Overrides the level chosen from flags
pub(crate) const LOG_ENV: &str = "TOKENBAR_LOG";

pub(crate) fn default_directive(debug: bool) -> &'static str {
    if debug { "warn,tokenbar=debug" } else { "warn" }
}

/// Initialize logging to stderr. Later calls are no-ops.
pub(crate) fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
