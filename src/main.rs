mod app;
mod cli;
mod config;
mod core;
mod error;
mod logging;
mod output;
mod pricing;
mod source;
mod utils;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.debug, !cli.no_color && std::io::stderr().is_terminal());

    let config = Config::load();
    let cli = cli.with_config(&config);

    match app::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
