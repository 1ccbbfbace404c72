use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use sedori_engine::cli::{commands, Cli};
use sedori_engine::config::EngineConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    config.init_logging();

    match commands::run(&cli, &config) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("✗ {e:#}");
            ExitCode::FAILURE
        }
    }
}
