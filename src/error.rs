//! Domain-specific error types for the provisioner.
//!
//! Internal modules attach a [`ProvisionError`] to the failure they hit and
//! return it through [`anyhow::Result`]; the binary converts the final error
//! into a non-zero exit status.
//!
//! # Error taxonomy
//!
//! ```text
//! ProvisionError
//! ├── EnvironmentUnrecognized — no package manager for this host (warning only)
//! ├── Download                — bootstrap script or release archive fetch failed
//! ├── PackageManager          — install command exited non-zero
//! ├── Filesystem              — backup, mkdir, link or copy failed
//! └── MissingSource           — a configured source does not exist
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::OsFamily;

/// Errors raised while provisioning a host.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The OS family has no supported package manager.
    ///
    /// Never fatal: the package step is skipped and its message is logged as
    /// a warning.
    #[error("unrecognized environment '{family}': no supported package manager")]
    EnvironmentUnrecognized {
        /// Detected family.
        family: OsFamily,
    },

    /// A network fetch failed after all retries.
    #[error("download failed for {url}: {reason}")]
    Download {
        /// URL that could not be fetched.
        url: String,
        /// Human-readable reason (transport error or HTTP status).
        reason: String,
    },

    /// The package manager reported a failure.
    #[error("{manager} failed to install {packages}: {reason}")]
    PackageManager {
        /// Package manager name (e.g. `apt`).
        manager: String,
        /// Space-separated package names passed to the install command.
        packages: String,
        /// Captured failure detail.
        reason: String,
    },

    /// A filesystem operation failed.
    #[error("{operation} failed for {}: {source}", path.display())]
    Filesystem {
        /// Short verb describing the operation (e.g. `"symlink"`).
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configured source path does not exist in the dotfiles root.
    #[error("source does not exist: {}", path.display())]
    MissingSource {
        /// The missing source path.
        path: PathBuf,
    },
}

impl ProvisionError {
    /// Build a [`ProvisionError::Filesystem`] for `path`.
    #[must_use]
    pub fn fs(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }
}
