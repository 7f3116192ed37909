use std::path::PathBuf;

use clap::Parser;

use crate::config::ProvisionMode;

const VERSION: &str = match option_env!("DOTFILES_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Install git, tmux and Neovim, then link their configuration into `$HOME`.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dotfiles-setup",
    about = "Provision a workstation with git, tmux and Neovim plus their configuration",
    version = VERSION
)]
pub struct Cli {
    /// Copy configuration files instead of symlinking them
    #[arg(long)]
    pub copy: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Override dotfiles root directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Skip tasks whose name contains any of these keywords
    #[arg(long, value_name = "TASK", value_delimiter = ',')]
    pub skip: Vec<String>,
}

impl Cli {
    /// How configuration files are placed.
    #[must_use]
    pub const fn mode(&self) -> ProvisionMode {
        if self.copy {
            ProvisionMode::Copy
        } else {
            ProvisionMode::Link
        }
    }
}
