use clap::Parser;
use orisort::cli::{Cli, effective_log_level, run_cli};
use orisort::config::Config;
use orisort::logging;
use orisort::output::OutputFormatter;
use std::process;
use tracing::Level;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            process::exit(1);
        }
    };

    let configured = config.logging.max_level().unwrap_or_else(|e| {
        OutputFormatter::warning(&format!("{}; using warn", e));
        Level::WARN
    });
    if let Err(e) = logging::setup(effective_log_level(configured, cli.verbose)) {
        OutputFormatter::warning(&e);
    }

    if let Err(e) = run_cli(&cli, &config) {
        OutputFormatter::error(&format!("Error: {}", e));
        process::exit(1);
    }
}
