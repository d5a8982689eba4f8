use tracing_subscriber::EnvFilter;

/// JSON lines on stdout; CloudWatch stamps the time. `RUST_LOG` overrides `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
