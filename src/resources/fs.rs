//! File-system resource helpers.
use anyhow::Result;
use std::path::Path;

use crate::error::ProvisionError;

/// Return `true` if anything exists at `path`, including a dangling symlink.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns [`ProvisionError::Filesystem`] if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ProvisionError::fs("create directory", parent, e))?;
    }
    Ok(())
}

/// Recursively copy a directory tree.
///
/// Symlinks within the source tree are followed, so the copy holds their
/// content rather than the links.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).map_err(|e| ProvisionError::fs("create directory", dst, e))?;
    let entries = std::fs::read_dir(src).map_err(|e| ProvisionError::fs("read directory", src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ProvisionError::fs("read directory", src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)
                .map_err(|e| ProvisionError::fs("copy", &dst_path, e))?;
        }
    }
    Ok(())
}

/// Copy a file or directory tree from `src` to `dst`.
///
/// # Errors
///
/// Returns an error if any part of the copy fails.
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        std::fs::copy(src, dst).map_err(|e| ProvisionError::fs("copy", dst, e))?;
        Ok(())
    }
}

/// Move whatever is at `src` (file, directory or symlink) to `dst`.
///
/// Uses a rename, falling back to copy and delete when the rename fails
/// (e.g. across filesystems). Symlinks are moved as links, never followed.
///
/// # Errors
///
/// Returns an error if neither the rename nor the fallback succeeds.
pub fn move_path(src: &Path, dst: &Path) -> Result<()> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    let meta = src
        .symlink_metadata()
        .map_err(|e| ProvisionError::fs("inspect", src, e))?;

    if meta.is_symlink() {
        let link = std::fs::read_link(src).map_err(|e| ProvisionError::fs("read link", src, e))?;
        create_symlink(&link, dst)?;
        std::fs::remove_file(src).map_err(|e| ProvisionError::fs("remove", src, e))?;
    } else if meta.is_dir() {
        copy_dir_recursive(src, dst)?;
        std::fs::remove_dir_all(src).map_err(|e| ProvisionError::fs("remove", src, e))?;
    } else {
        std::fs::copy(src, dst).map_err(|e| ProvisionError::fs("copy", dst, e))?;
        std::fs::remove_file(src).map_err(|e| ProvisionError::fs("remove", src, e))?;
    }
    Ok(())
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns [`ProvisionError::Filesystem`] if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|e| ProvisionError::fs("symlink", link, e))?;
    Ok(())
}
