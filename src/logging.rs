//! Diagnostic logging setup.
use tracing::{Level, debug, subscriber};
use tracing_subscriber::FmtSubscriber;

/// Installs the global subscriber. Diagnostics go to stderr so they do not
/// mix with the summaries printed on stdout.
pub fn setup(max_level: Level) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Could not set up logging: {}", e))?;

    debug!("Logging at {} level", max_level);
    Ok(())
}
