//! Log output for the CLI.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a stderr subscriber. `-v` enables debug logs, `-vv` trace logs;
/// without either, `RUST_LOG` decides and the default is warnings only.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
