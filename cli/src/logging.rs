//! Log output for the command-line tool.
//!
//! Logs go to stderr so stdout stays pure JSON. The default level is WARN;
//! `RUST_LOG` overrides it.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
