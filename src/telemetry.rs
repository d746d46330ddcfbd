use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber, filtered by `RUST_LOG` (default
/// `info`). Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
