//! Diagnostics on stderr; stdout is reserved for command output

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `-v`.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
