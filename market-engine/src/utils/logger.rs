//! Logging Infrastructure
//!
//! Structured logging setup shared by binaries and tests.

/// Initialize the logger with the default `info` level
pub fn init_logger() {
    init_logger_with_level(None);
}

/// Initialize the logger with an explicit level override
///
/// `RUST_LOG` wins over the passed level when set. Safe to call more than
/// once; later calls are no-ops.
pub fn init_logger_with_level(log_level: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .try_init();
}
