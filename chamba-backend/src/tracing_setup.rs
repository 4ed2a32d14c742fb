use std::sync::Arc;

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Handle for swapping the active log filter at runtime.
pub type ReloadHandle = Arc<dyn Fn(EnvFilter) -> Result<(), String> + Send + Sync>;

/// Install the global subscriber from `LoggingConfig`.
///
/// `RUST_LOG` wins over the configured level. Returns a reload handle so the
/// filter can be tightened or relaxed without restarting the process.
pub fn install_tracing_from_config(cfg: &chamba_config::LoggingConfig) -> Option<ReloadHandle> {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| cfg.level.clone());

    // The json and plain subscribers are distinct types and the reload layer
    // is generic over the subscriber, so each branch builds its own stack and
    // only the type-erased handle escapes.
    if cfg.json {
        let env_filter = EnvFilter::new(&directives);
        let (reload_layer, reload_handle) =
            tracing_subscriber::reload::Layer::new(env_filter.clone());

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_timer(ChronoUtc::rfc_3339())
            .finish()
            .with(reload_layer)
            .init();

        Some(Arc::new(move |filter| {
            reload_handle
                .reload(filter)
                .map_err(|e| format!("reload failed: {e}"))
        }))
    } else {
        let env_filter = EnvFilter::new(&directives);
        let (reload_layer, reload_handle) =
            tracing_subscriber::reload::Layer::new(env_filter.clone());

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .finish()
            .with(reload_layer)
            .init();

        Some(Arc::new(move |filter| {
            reload_handle
                .reload(filter)
                .map_err(|e| format!("reload failed: {e}"))
        }))
    }
}
