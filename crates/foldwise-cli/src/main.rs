//! foldwise command-line interface
//!
//! ```bash
//! foldwise runs list --task 59 --size 20
//! foldwise runs get 473350
//! foldwise tasks get 59
//! foldwise run 59 --model logistic --search grid --publish
//! foldwise config init
//! ```

mod args;
mod commands;
mod console;
mod logging;
mod router;

use args::Cli;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = console::CliConsole::new(cli.verbose);
    match router::route(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
