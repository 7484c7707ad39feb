// logging.rs - tracing setup for the binaries

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "csv_combiner=warn";
const VERBOSE_LOG_FILTER: &str = "csv_combiner=debug";

/// Install a stderr fmt subscriber. `RUST_LOG` wins over `verbose`.
///
/// Calling this twice is harmless; the second call keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        })
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
