//! Logging to stderr, configured from [`CliConfig`].
//!
//! Command output goes to stdout, so diagnostics never mix with the JSON
//! a command may print. Records emitted through the `log` facade by the
//! library are forwarded to the same subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

fn filter_from_config(config: &CliConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Install the global subscriber.
///
/// Level precedence, highest first: `--log-level`, then
/// `BDD_OUTLINE_LOG_LEVEL`, then the default.
///
/// A subscriber that is already installed wins; later calls are ignored.
pub(crate) fn init_logging(config: &CliConfig) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter_from_config(config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}
