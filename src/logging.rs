use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "blogdesk=debug,tower_http=debug";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
/// Later calls are no-ops, so tests may call this freely.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init();
    if result.is_err() {
        tracing::trace!("logging already initialised");
    }
}
