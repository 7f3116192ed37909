//! A configuration file or directory materialized into `$HOME`.
use std::path::PathBuf;

use anyhow::Result;

use super::backup::BackupDir;
use super::fs::{copy_path, create_symlink, ensure_parent_dir, entry_exists};
use super::{Resource, ResourceState};
use crate::config::ProvisionMode;
use crate::error::ProvisionError;

/// A source in the dotfiles root placed at a target under `$HOME`.
#[derive(Debug)]
pub struct ProvisionedFile<'a> {
    /// Absolute source path.
    pub source: PathBuf,
    /// Absolute target path.
    pub target: PathBuf,
    /// Link or copy.
    pub mode: ProvisionMode,
    backup: &'a BackupDir,
}

impl<'a> ProvisionedFile<'a> {
    /// Create a new provisioned file.
    #[must_use]
    pub const fn new(
        source: PathBuf,
        target: PathBuf,
        mode: ProvisionMode,
        backup: &'a BackupDir,
    ) -> Self {
        Self {
            source,
            target,
            mode,
            backup,
        }
    }

    /// Whether applying will displace something at the target.
    #[must_use]
    pub fn will_back_up(&self) -> bool {
        entry_exists(&self.target)
    }

    /// Apply and return where a displaced target was moved, if anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingSource`] if the source does not exist
    /// and [`ProvisionError::Filesystem`] if backing up, creating the parent
    /// directory, copying or linking fails.
    pub fn provision(&self) -> Result<Option<PathBuf>> {
        if !self.source.exists() {
            return Err(ProvisionError::MissingSource {
                path: self.source.clone(),
            }
            .into());
        }

        let backed_up = if self.will_back_up() {
            Some(self.backup.stash(&self.target)?)
        } else {
            None
        };

        ensure_parent_dir(&self.target)?;
        match self.mode {
            ProvisionMode::Copy => copy_path(&self.source, &self.target)?,
            ProvisionMode::Link => create_symlink(&self.source, &self.target)?,
        }
        Ok(backed_up)
    }
}

impl Resource for ProvisionedFile<'_> {
    fn description(&self) -> String {
        let arrow = match self.mode {
            ProvisionMode::Link => "->",
            ProvisionMode::Copy => "<=",
        };
        format!(
            "{} {arrow} {}",
            self.target.display(),
            self.source.display()
        )
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        if !entry_exists(&self.target) {
            return Ok(ResourceState::Missing);
        }

        // A copied target is always refreshed.
        if self.mode == ProvisionMode::Copy {
            return Ok(ResourceState::Incorrect {
                current: "existing entry is replaced by a fresh copy".to_string(),
            });
        }

        match std::fs::read_link(&self.target) {
            Ok(existing) if existing == self.source => Ok(ResourceState::Correct),
            Ok(existing) => Ok(ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            }),
            Err(_) if self.target.is_dir() => Ok(ResourceState::Incorrect {
                current: "target is a directory".to_string(),
            }),
            Err(_) => Ok(ResourceState::Incorrect {
                current: "target is a regular file".to_string(),
            }),
        }
    }
}
