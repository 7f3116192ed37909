//! Per-run backup directory for displaced targets.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use super::fs::{ensure_parent_dir, entry_exists, move_path};
use crate::error::ProvisionError;

/// `strftime` format of the per-run directory name.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A timestamped directory under the backup root, created on first use.
///
/// Displaced entries keep their path relative to `$HOME`; a numeric suffix
/// is appended when a name is already taken so nothing is overwritten.
#[derive(Debug)]
pub struct BackupDir {
    dir: PathBuf,
    home: PathBuf,
    used: AtomicBool,
}

impl BackupDir {
    /// Backup directory named after the current local time.
    #[must_use]
    pub fn for_now(backup_root: &Path, home: &Path) -> Self {
        let stamp = chrono::Local::now().format(STAMP_FORMAT).to_string();
        Self::new(backup_root, home, &stamp)
    }

    /// Backup directory named `stamp`, or `stamp_N` if that name already
    /// exists from an earlier run.
    #[must_use]
    pub fn new(backup_root: &Path, home: &Path, stamp: &str) -> Self {
        let dir = unique_path(&backup_root.join(stamp), '_');
        Self {
            dir,
            home: home.to_path_buf(),
            used: AtomicBool::new(false),
        }
    }

    /// Path of this run's backup directory (it may not exist yet).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Whether anything has been moved into the directory.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::SeqCst)
    }

    /// Where `target` would be stored.
    #[must_use]
    pub fn destination_for(&self, target: &Path) -> PathBuf {
        let relative = target.strip_prefix(&self.home).map_or_else(
            |_| {
                target
                    .file_name()
                    .map_or_else(|| PathBuf::from("entry"), PathBuf::from)
            },
            Path::to_path_buf,
        );
        unique_path(&self.dir.join(relative), '.')
    }

    /// Move `target` into the backup directory and return its new path.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Filesystem`] if the directory cannot be
    /// created or the move fails.
    pub fn stash(&self, target: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ProvisionError::fs("create directory", &self.dir, e))?;
        self.used.store(true, Ordering::SeqCst);

        let dest = self.destination_for(target);
        ensure_parent_dir(&dest)?;
        move_path(target, &dest)?;
        Ok(dest)
    }
}

/// `path` if free, otherwise the first free `path{sep}N`.
fn unique_path(path: &Path, sep: char) -> PathBuf {
    if !entry_exists(path) {
        return path.to_path_buf();
    }
    let mut n = 1u32;
    loop {
        let mut name = path.as_os_str().to_os_string();
        name.push(format!("{sep}{n}"));
        let candidate = PathBuf::from(name);
        if !entry_exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
