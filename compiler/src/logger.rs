//! Structured logging via tracing.

use tracing_subscriber::{EnvFilter, fmt};

/// Env var holding the filter directive, e.g. `FLOWC_LOG=flowc::lower=debug,info`.
pub const LOG_ENV: &str = "FLOWC_LOG";

/// Initialize the global tracing subscriber. Logs go to stderr so lowered
/// JSON on stdout stays machine readable.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Initialize logger for tests (does not panic if called multiple times).
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
