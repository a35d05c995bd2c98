mod bootstrap;
mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = cli::Cli::parse();
    bootstrap::init_logging();

    let result = bootstrap::AppConfig::from_cli(cli).and_then(|config| bootstrap::run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
