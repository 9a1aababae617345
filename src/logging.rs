//! Logging setup for the service binaries.
//!
//! Installs a global tracing subscriber writing to stdout, filtered through
//! `RUST_LOG` with an `info` default. Safe to call more than once.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
