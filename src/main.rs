//! `hostwatch` command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use hostwatch::cli_app::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli_app::run(&cli) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
