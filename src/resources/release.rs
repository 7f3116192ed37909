//! Prebuilt release archives installed under a system prefix.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::download::{self, Checksum, Downloader};
use super::package::Privilege;
use super::{Resource, ResourceState};
use crate::config::packages::ReleaseArchive;
use crate::error::ProvisionError;
use crate::exec::Executor;

/// Directory archives are extracted into.
pub const INSTALL_PREFIX: &str = "/opt";

/// Directory the binary is linked into.
pub const BIN_DIR: &str = "/usr/local/bin";

/// A release archive that can be checked and installed.
#[derive(Debug)]
pub struct ReleaseArchiveResource<'a> {
    archive: &'a ReleaseArchive,
    prefix: PathBuf,
    bin_dir: PathBuf,
    staging_root: PathBuf,
    privilege: Privilege,
    executor: &'a dyn Executor,
    downloader: &'a dyn Downloader,
}

impl<'a> ReleaseArchiveResource<'a> {
    /// Create a resource installing into [`INSTALL_PREFIX`] and [`BIN_DIR`].
    #[must_use]
    pub fn new(
        archive: &'a ReleaseArchive,
        privilege: Privilege,
        executor: &'a dyn Executor,
        downloader: &'a dyn Downloader,
    ) -> Self {
        Self {
            archive,
            prefix: PathBuf::from(INSTALL_PREFIX),
            bin_dir: PathBuf::from(BIN_DIR),
            staging_root: std::env::temp_dir(),
            privilege,
            executor,
            downloader,
        }
    }

    /// Override the install locations. `staging_root` is where the private
    /// per-run download directory is created.
    #[must_use]
    pub fn with_dirs(mut self, prefix: &Path, bin_dir: &Path, staging_root: &Path) -> Self {
        self.prefix = prefix.to_path_buf();
        self.bin_dir = bin_dir.to_path_buf();
        self.staging_root = staging_root.to_path_buf();
        self
    }

    /// Path of the binary inside the extracted archive.
    #[must_use]
    pub fn installed_binary(&self) -> PathBuf {
        self.prefix
            .join(&self.archive.extracted_dir)
            .join("bin")
            .join(&self.archive.binary)
    }

    /// Download, verify, extract and link the archive.
    ///
    /// The archive is staged in a fresh owner-only directory that is removed
    /// once extraction finishes, so nothing another user placed in the
    /// shared temp directory is written through or extracted.
    ///
    /// Returns the checksum outcome so the caller can report an unverified
    /// install.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Download`] on network or checksum failure
    /// and [`ProvisionError::PackageManager`] if extraction or linking fails.
    pub fn install(&self) -> Result<Checksum> {
        let staging = tempfile::Builder::new()
            .prefix("dotfiles-setup-")
            .tempdir_in(&self.staging_root)
            .map_err(|e| ProvisionError::fs("create directory", &self.staging_root, e))?;
        let archive_path = staging.path().join(&self.archive.file_name);

        self.downloader.fetch_to(&self.archive.url, &archive_path)?;
        let checksum = download::verify_checksum(
            self.downloader,
            &self.archive.checksum_url,
            &self.archive.file_name,
            &archive_path,
        )?;

        self.unpack(&archive_path)?;
        drop(staging);
        Ok(checksum)
    }

    fn unpack(&self, archive_path: &Path) -> Result<()> {
        let fail = |reason: anyhow::Error| ProvisionError::PackageManager {
            manager: "release archive".to_string(),
            packages: self.archive.file_name.clone(),
            reason: format!("{reason:#}"),
        };

        let prefix = self.prefix.display().to_string();
        let extracted = self.prefix.join(&self.archive.extracted_dir);
        let extracted = extracted.display().to_string();
        let archive = archive_path.display().to_string();
        let bin_dir = self.bin_dir.display().to_string();
        let binary = self.installed_binary().display().to_string();
        let link = self.bin_dir.join(&self.archive.binary).display().to_string();

        self.privilege
            .run(self.executor, "rm", &["-rf", &extracted])
            .map_err(fail)?;
        self.privilege
            .run(self.executor, "tar", &["-C", &prefix, "-xzf", &archive])
            .map_err(fail)?;
        self.privilege
            .run(self.executor, "mkdir", &["-p", &bin_dir])
            .map_err(fail)?;
        self.privilege
            .run(self.executor, "ln", &["-sf", &binary, &link])
            .map_err(fail)?;
        Ok(())
    }
}

impl Resource for ReleaseArchiveResource<'_> {
    fn description(&self) -> String {
        format!("{} (release archive)", self.archive.binary)
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.executor.which(&self.archive.binary) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
