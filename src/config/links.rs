//! Configuration files to provision and the provisioning mode.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// How configuration files are materialized into `$HOME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProvisionMode {
    /// Create a symbolic link at the target pointing to the source.
    #[default]
    Link,
    /// Recursively copy the source to the target.
    Copy,
}

impl fmt::Display for ProvisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => f.write_str("link"),
            Self::Copy => f.write_str("copy"),
        }
    }
}

/// A dotfile to provision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    /// Source path, relative to the dotfiles root.
    pub source: PathBuf,
    /// Target path, relative to `$HOME`.
    pub target: PathBuf,
}

impl LinkSpec {
    /// Create a new link spec.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Absolute source path under `root`.
    #[must_use]
    pub fn source_in(&self, root: &Path) -> PathBuf {
        root.join(&self.source)
    }

    /// Absolute target path under `home`.
    #[must_use]
    pub fn target_in(&self, home: &Path) -> PathBuf {
        home.join(&self.target)
    }
}

/// The built-in list: tmux configuration and the Neovim configuration directory.
#[must_use]
pub fn default_links() -> Vec<LinkSpec> {
    vec![
        LinkSpec::new("tmux/tmux.conf", ".tmux.conf"),
        LinkSpec::new("nvim", ".config/nvim"),
    ]
}
