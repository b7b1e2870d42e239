//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `[logging] level` is set
pub const DEFAULT_FILTER: &str = "fooderator_api=info,fooderator_common=info,tower_http=info";

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `fallback` (the configured level) and finally
/// [`DEFAULT_FILTER`].
pub fn init_tracing(fallback: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
