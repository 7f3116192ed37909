//! Run configuration: built-in defaults plus the optional `provision.toml`.
pub mod links;
pub mod packages;
pub mod toml_loader;
pub mod validation;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use links::{LinkSpec, ProvisionMode};

/// Optional override file at the dotfiles root.
pub const CONFIG_FILE: &str = "provision.toml";

/// Directory under `$HOME` that receives displaced targets.
pub const BACKUP_DIR: &str = ".dotfiles_backup";

/// On-disk shape of [`CONFIG_FILE`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProvisionFile {
    #[serde(default)]
    packages: Option<Vec<String>>,
    #[serde(default)]
    links: Option<Vec<LinkSpec>>,
}

/// Immutable run configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dotfiles repository root.
    pub root: PathBuf,
    /// The user's home directory.
    pub home: PathBuf,
    /// Link or copy.
    pub mode: ProvisionMode,
    /// Preview actions without mutating the host.
    pub dry_run: bool,
    /// Logical package names to install.
    pub packages: Vec<String>,
    /// Files to provision.
    pub links: Vec<LinkSpec>,
    /// Task name keywords to skip.
    pub skip: Vec<String>,
}

impl Config {
    /// Load configuration for `root`, applying `provision.toml` overrides
    /// on top of the built-in package and link lists.
    ///
    /// # Errors
    ///
    /// Returns an error if `provision.toml` exists but cannot be read or
    /// contains unknown keys.
    pub fn load(
        root: &Path,
        home: &Path,
        mode: ProvisionMode,
        dry_run: bool,
        skip: Vec<String>,
    ) -> Result<Self> {
        let file: ProvisionFile = toml_loader::load_config(&root.join(CONFIG_FILE))
            .with_context(|| format!("loading {CONFIG_FILE}"))?;

        Ok(Self {
            root: root.to_path_buf(),
            home: home.to_path_buf(),
            mode,
            dry_run,
            packages: file.packages.unwrap_or_else(packages::default_packages),
            links: file.links.unwrap_or_else(links::default_links),
            skip,
        })
    }

    /// Root of all backups for this home directory.
    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        self.home.join(BACKUP_DIR)
    }

    /// Run all validators and return their warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        let mut warnings = validation::validate_packages(&self.packages);
        warnings.extend(validation::validate_links(&self.links, &self.root));
        warnings
    }
}

/// Resolve the home directory from `$HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is unset or empty.
pub fn home_dir() -> Result<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => anyhow::bail!("HOME is not set"),
    }
}
