//! `dotfiles-setup` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dotfiles_setup::cli::Cli;
use dotfiles_setup::commands;
use dotfiles_setup::logging::{self, Logger};

const COMMAND: &str = "install";

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let cli = Cli::parse();
    logging::init_subscriber(cli.verbose, COMMAND);
    let log = Arc::new(Logger::new(COMMAND));
    commands::install::run(&cli, &log)
}
