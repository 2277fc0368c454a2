mod commands;
mod domain;
mod logging;
mod services;
#[cfg(test)]
mod test_support;

use std::io;
use std::process::ExitCode;

use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::forecast_cmd::forecast_command;
use crate::logging::init_tracing;
use clap::{CommandFactory, Parser};
use clap_complete::generate;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match args.command {
        Commands::Forecast(forecast) => {
            init_tracing();
            if let Err(e) = forecast_command(&forecast) {
                eprintln!("Failed to forecast backlog: {e}");
                return ExitCode::FAILURE;
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = CliArgs::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }
    ExitCode::SUCCESS
}
