//! halform command-line entry point.
//!
//! Parses the arguments, runs the selected subcommand, and turns failures
//! into colored, actionable messages on stderr with exit code 1.

use anyhow::Result;
use clap::Parser;
use halform::cli;
use halform::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
