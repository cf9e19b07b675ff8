use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default;
/// a second call is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
