//! Host state primitives: packages, release archives and provisioned files,
//! each able to report whether it is already in place.
pub mod backup;
pub mod download;
pub mod fs;
pub mod package;
pub mod provisioned_file;
pub mod release;

use anyhow::Result;

/// What a resource found on the host before changing anything.
///
/// # Examples
///
/// ```
/// use dotfiles_setup::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "points to /old/tmux.conf".into() };
/// assert_ne!(stale, ResourceState::Correct);
/// assert_ne!(ResourceState::Missing, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing is there yet.
    Missing,
    /// Already in the desired state.
    Correct,
    /// Something else is in the way.
    Incorrect {
        /// What is there instead.
        current: String,
    },
    /// Cannot be applied at all, e.g. its source is gone.
    Invalid {
        /// Why not.
        reason: String,
    },
}

/// A piece of host state (a package, a binary, a file under `$HOME`) that
/// can be inspected.
///
/// Changing the host stays with each resource's own method
/// ([`Installer::install`](package::Installer::install),
/// [`ReleaseArchiveResource::install`](release::ReleaseArchiveResource::install),
/// [`ProvisionedFile::provision`](provisioned_file::ProvisionedFile::provision))
/// because each reports a different outcome.
pub trait Resource {
    /// Short label for log lines.
    fn description(&self) -> String;

    /// Inspect the host.
    ///
    /// # Errors
    ///
    /// Returns an error if probing the host fails.
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether the host differs from the desired state. Invalid
    /// resources never need a change; callers report them instead.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}
