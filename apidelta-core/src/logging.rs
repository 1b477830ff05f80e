//! Subscriber bootstrap for applications embedding the differ.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity flags.
pub fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install a stderr `fmt` subscriber, honouring `RUST_LOG` when set.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(verbose: bool, quiet: bool) -> bool {
    let filter = default_filter(verbose, quiet);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .try_init()
        .is_ok()
}
