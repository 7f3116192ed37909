//! Workstation provisioner.
//!
//! Detects the host's OS family, installs git, tmux and Neovim with the
//! native package manager (or a pinned release archive where the native
//! package is too old), then links or copies the tmux and Neovim
//! configuration from this repository into `$HOME`, moving anything it
//! would overwrite into a timestamped backup directory.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: built-in defaults and the optional `provision.toml`
//! - **[`resources`]**: host state checks and changes (packages, files, backups)
//! - **[`tasks`]**: named units of work wired to resources
//! - **[`commands`]**: the `install` orchestration and root resolution
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tasks;
