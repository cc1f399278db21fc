//! `cargo outline`: parse, validate and inspect bdd-outline feature
//! documents from the command line.
//!
//! Command output is written to stdout; logs and errors go to stderr.

mod cli;
mod config;
mod discovery;
mod logging;
mod output;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use crate::cli::{Cli, Status, cargo_args, run};
use crate::config::CliConfig;
use crate::logging::init_logging;

/// Exit code for an invalid configuration.
const CONFIG_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse_from(cargo_args(std::env::args_os()));
    let config = match CliConfig::from_env() {
        Ok(config) => config.apply_overrides(cli.log_level),
        Err(e) => {
            init_logging(&CliConfig::default());
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::from(CONFIG_ERROR);
        }
    };
    init_logging(&config);

    let mut stdout = io::stdout().lock();
    match run(cli.command, &mut stdout) {
        Ok(Status::Success) => ExitCode::SUCCESS,
        Ok(Status::Failed) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
