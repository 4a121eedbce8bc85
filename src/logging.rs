//! Logging infrastructure for twig.
//!
//! Diagnostics go through `tracing` and are written to stderr so they never mix
//! with command output on stdout. Logging is off unless the `TWIG_LOG`
//! environment variable holds a filter directive (for example `TWIG_LOG=debug`
//! or `TWIG_LOG=twig::artifacts::merge=trace`). Builds with the `debug_merge`
//! feature default to debug output for the merge modules.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directive
pub const LOG_ENV_VAR: &str = "TWIG_LOG";

const MERGE_DEBUG_FILTER: &str = "twig::artifacts::merge=debug,twig::commands::porcelain::merge=debug";

/// Build the filter from `TWIG_LOG`, falling back to the compiled-in default.
pub fn log_filter() -> anyhow::Result<EnvFilter> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directive) if !directive.trim().is_empty() => Ok(EnvFilter::try_new(directive.trim())?),
        _ => Ok(default_filter()),
    }
}

fn default_filter() -> EnvFilter {
    if cfg!(feature = "debug_merge") {
        EnvFilter::new(MERGE_DEBUG_FILTER)
    } else {
        EnvFilter::new("off")
    }
}

/// Initialize the global subscriber.
///
/// Must be called at most once per process; the binary calls it before
/// dispatching a command.
pub fn init_logging() -> anyhow::Result<()> {
    let filter = log_filter()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .without_time(),
        )
        .try_init()?;

    Ok(())
}
