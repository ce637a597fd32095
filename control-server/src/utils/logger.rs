//! Logging Infrastructure
//!
//! Structured logging setup. `RUST_LOG` takes precedence over the configured
//! level so operators can raise verbosity per target without a restart config.

use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},sqlx=warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .init();
}
