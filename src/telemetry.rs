use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "myflix_api=debug,tower_http=info";

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides `DEFAULT_FILTER`. Calling this twice fails quietly.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init();
}
