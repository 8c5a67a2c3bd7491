//! Test subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs a test-writer `fmt` subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to `warn`. Later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
