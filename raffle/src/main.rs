//! `raffle` - trivia kiosk for earning raffle tickets

use clap::Parser;

use raffle::cli::args::Cli;
use raffle::cli::commands;
use raffle::error::{ExitCode, RaffleError};
use raffle::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    // `play` installs its own signal handling so it can save before exiting.
    match commands::dispatch(cli).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(RaffleError::Interrupted { code }) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
