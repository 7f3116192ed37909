//! Native package resources and the package managers that install them.
use std::fmt;
use std::path::Path;

use anyhow::Result;

use super::{Resource, ResourceState};
use crate::error::ProvisionError;
use crate::exec::Executor;
use crate::platform::OsFamily;

/// Homebrew install script, run non-interactively when `brew` is absent.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Locations Homebrew installs itself to on Apple silicon and Intel Macs.
pub const BREW_FALLBACK_PATHS: &[&str] = &["/opt/homebrew/bin/brew", "/usr/local/bin/brew"];

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Homebrew (macOS).
    Brew,
    /// APT (Debian and derivatives).
    Apt,
    /// DNF (Fedora and RHEL derivatives).
    Dnf,
    /// pacman (Arch and derivatives).
    Pacman,
    /// apk (Alpine).
    Apk,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Brew => "brew",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Apk => "apk",
        };
        f.write_str(name)
    }
}

impl PackageManager {
    /// Package manager for `family`, or `None` for unrecognized hosts.
    #[must_use]
    pub const fn for_family(family: OsFamily) -> Option<Self> {
        match family {
            OsFamily::MacOs => Some(Self::Brew),
            OsFamily::Debian => Some(Self::Apt),
            OsFamily::Fedora => Some(Self::Dnf),
            OsFamily::Arch => Some(Self::Pacman),
            OsFamily::Alpine => Some(Self::Apk),
            OsFamily::Linux | OsFamily::Unknown => None,
        }
    }

    /// Whether install commands need root.
    #[must_use]
    pub const fn needs_root(self) -> bool {
        !matches!(self, Self::Brew)
    }

    /// Command that exits zero when `package` is installed.
    fn check_command<'a>(self, brew: &'a str, package: &'a str) -> (&'a str, Vec<&'a str>) {
        match self {
            Self::Brew => (brew, vec!["list", "--versions", package]),
            Self::Apt => ("dpkg", vec!["-s", package]),
            Self::Dnf => ("rpm", vec!["-q", package]),
            Self::Pacman => ("pacman", vec!["-Q", package]),
            Self::Apk => ("apk", vec!["info", "-e", package]),
        }
    }
}

/// How root-only commands are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Already root; run commands as-is.
    Root,
    /// Prefix commands with `sudo`.
    Sudo,
}

impl Privilege {
    /// Resolve once per run: root when `id -u` reports 0, otherwise `sudo`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::PackageManager`] when not running as root
    /// and `sudo` is not available.
    pub fn resolve(executor: &dyn Executor, manager: PackageManager) -> Result<Self> {
        let uid = executor.run_unchecked("id", &["-u"])?;
        if uid.success && uid.stdout.trim() == "0" {
            return Ok(Self::Root);
        }
        if executor.which("sudo") {
            return Ok(Self::Sudo);
        }
        Err(ProvisionError::PackageManager {
            manager: manager.to_string(),
            packages: String::new(),
            reason: "not running as root and sudo is not available".to_string(),
        }
        .into())
    }

    /// Run `program args` with this privilege.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run(
        self,
        executor: &dyn Executor,
        program: &str,
        args: &[&str],
    ) -> Result<crate::exec::ExecResult> {
        match self {
            Self::Root => executor.run(program, args),
            Self::Sudo => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(program);
                full.extend_from_slice(args);
                executor.run("sudo", &full)
            }
        }
    }
}

/// The resolved tool used for install commands on this host.
#[derive(Debug, Clone)]
pub struct Installer {
    /// Package manager family.
    pub manager: PackageManager,
    /// Privilege strategy for root-only managers.
    pub privilege: Privilege,
    /// Program used for Homebrew commands (`brew` or an absolute fallback).
    pub brew: String,
}

impl Installer {
    /// Create an installer that finds `brew` on `PATH`.
    #[must_use]
    pub fn new(manager: PackageManager, privilege: Privilege) -> Self {
        Self {
            manager,
            privilege,
            brew: "brew".to_string(),
        }
    }

    /// Use `brew` at `path` instead of relying on `PATH`.
    #[must_use]
    pub fn with_brew(mut self, path: &Path) -> Self {
        self.brew = path.display().to_string();
        self
    }

    /// Install `packages` with one batched command, or one command per
    /// package for Homebrew.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::PackageManager`] if any install command fails.
    pub fn install(&self, executor: &dyn Executor, packages: &[&str]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let fail = |reason: anyhow::Error| ProvisionError::PackageManager {
            manager: self.manager.to_string(),
            packages: packages.join(" "),
            reason: format!("{reason:#}"),
        };

        match self.manager {
            PackageManager::Brew => {
                for package in packages {
                    executor.run(&self.brew, &["install", *package]).map_err(fail)?;
                }
            }
            PackageManager::Apt => {
                self.privilege
                    .run(executor, "apt-get", &["update"])
                    .map_err(fail)?;
                let mut args = vec!["install", "-y"];
                args.extend_from_slice(packages);
                self.privilege.run(executor, "apt-get", &args).map_err(fail)?;
            }
            PackageManager::Dnf => {
                let mut args = vec!["install", "-y"];
                args.extend_from_slice(packages);
                self.privilege.run(executor, "dnf", &args).map_err(fail)?;
            }
            PackageManager::Pacman => {
                let mut args = vec!["-S", "--needed", "--noconfirm"];
                args.extend_from_slice(packages);
                self.privilege.run(executor, "pacman", &args).map_err(fail)?;
            }
            PackageManager::Apk => {
                let mut args = vec!["add"];
                args.extend_from_slice(packages);
                self.privilege.run(executor, "apk", &args).map_err(fail)?;
            }
        }
        Ok(())
    }
}

/// Find `brew` on `PATH`, then in the well-known install locations.
#[must_use]
pub fn locate_brew(executor: &dyn Executor) -> Option<std::path::PathBuf> {
    if executor.which("brew") {
        return Some("brew".into());
    }
    BREW_FALLBACK_PATHS
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| p.exists())
}

/// A native package that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Name understood by the package manager.
    pub name: String,
    installer: &'a Installer,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, installer: &'a Installer, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            installer,
            executor,
        }
    }
}

impl Resource for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.installer.manager)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let (program, args) = self
            .installer
            .manager
            .check_command(&self.installer.brew, &self.name);
        let result = self.executor.run_unchecked(program, &args)?;
        if result.success {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn family_to_manager() {
        assert_eq!(
            PackageManager::for_family(OsFamily::MacOs),
            Some(PackageManager::Brew)
        );
        assert_eq!(
            PackageManager::for_family(OsFamily::Debian),
            Some(PackageManager::Apt)
        );
        assert_eq!(
            PackageManager::for_family(OsFamily::Fedora),
            Some(PackageManager::Dnf)
        );
        assert_eq!(
            PackageManager::for_family(OsFamily::Arch),
            Some(PackageManager::Pacman)
        );
        assert_eq!(
            PackageManager::for_family(OsFamily::Alpine),
            Some(PackageManager::Apk)
        );
        assert_eq!(PackageManager::for_family(OsFamily::Linux), None);
        assert_eq!(PackageManager::for_family(OsFamily::Unknown), None);
    }

    #[test]
    fn check_commands_per_manager() {
        let cases = [
            (PackageManager::Brew, "brew list --versions git"),
            (PackageManager::Apt, "dpkg -s git"),
            (PackageManager::Dnf, "rpm -q git"),
            (PackageManager::Pacman, "pacman -Q git"),
            (PackageManager::Apk, "apk info -e git"),
        ];
        for (manager, expected) in cases {
            let executor = MockExecutor::new();
            let installer = Installer::new(manager, Privilege::Root);
            let resource = PackageResource::new("git".to_string(), &installer, &executor);
            assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
            assert_eq!(executor.calls(), vec![expected.to_string()]);
        }
    }

    #[test]
    fn failed_check_means_missing() {
        let executor = MockExecutor::with_responses(vec![(false, String::new())]);
        let installer = Installer::new(PackageManager::Apt, Privilege::Root);
        let resource = PackageResource::new("tmux".to_string(), &installer, &executor);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.description(), "tmux (apt)");
    }

    #[test]
    fn privilege_root_when_uid_zero() {
        let executor = MockExecutor::with_responses(vec![(true, "0\n".to_string())]);
        let privilege = Privilege::resolve(&executor, PackageManager::Apt).unwrap();
        assert_eq!(privilege, Privilege::Root);
    }

    #[test]
    fn privilege_sudo_for_regular_user() {
        let executor = MockExecutor::with_responses(vec![(true, "1000\n".to_string())])
            .with_available(&["sudo"]);
        let privilege = Privilege::resolve(&executor, PackageManager::Dnf).unwrap();
        assert_eq!(privilege, Privilege::Sudo);
    }

    #[test]
    fn privilege_fails_without_root_or_sudo() {
        let executor = MockExecutor::with_responses(vec![(true, "1000\n".to_string())]);
        let err = Privilege::resolve(&executor, PackageManager::Pacman).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::PackageManager { .. })
        ));
    }

    #[test]
    fn apt_updates_then_batch_installs_with_sudo() {
        let executor = MockExecutor::new();
        let installer = Installer::new(PackageManager::Apt, Privilege::Sudo);
        installer.install(&executor, &["git", "tmux"]).unwrap();
        assert_eq!(
            executor.calls(),
            vec![
                "sudo apt-get update".to_string(),
                "sudo apt-get install -y git tmux".to_string(),
            ]
        );
    }

    #[test]
    fn batch_commands_as_root() {
        let cases = [
            (PackageManager::Dnf, "dnf install -y git tmux"),
            (PackageManager::Pacman, "pacman -S --needed --noconfirm git tmux"),
            (PackageManager::Apk, "apk add git tmux"),
        ];
        for (manager, expected) in cases {
            let executor = MockExecutor::new();
            Installer::new(manager, Privilege::Root)
                .install(&executor, &["git", "tmux"])
                .unwrap();
            assert_eq!(executor.calls(), vec![expected.to_string()]);
        }
    }

    #[test]
    fn brew_installs_one_package_per_command() {
        let executor = MockExecutor::new();
        let installer = Installer::new(PackageManager::Brew, Privilege::Root)
            .with_brew(Path::new("/opt/homebrew/bin/brew"));
        installer
            .install(&executor, &["git", "tmux", "neovim"])
            .unwrap();
        assert_eq!(
            executor.calls(),
            vec![
                "/opt/homebrew/bin/brew install git".to_string(),
                "/opt/homebrew/bin/brew install tmux".to_string(),
                "/opt/homebrew/bin/brew install neovim".to_string(),
            ]
        );
    }

    #[test]
    fn install_failure_is_package_manager_error() {
        let executor = MockExecutor::with_responses(vec![(false, String::new())]);
        let installer = Installer::new(PackageManager::Dnf, Privilege::Root);
        let err = installer.install(&executor, &["git", "neovim"]).unwrap_err();
        let Some(ProvisionError::PackageManager {
            manager, packages, ..
        }) = err.downcast_ref::<ProvisionError>()
        else {
            panic!("expected PackageManager error, got {err:#}");
        };
        assert_eq!(manager, "dnf");
        assert_eq!(packages, "git neovim");
    }

    #[test]
    fn empty_install_runs_nothing() {
        let executor = MockExecutor::new();
        Installer::new(PackageManager::Apt, Privilege::Root)
            .install(&executor, &[])
            .unwrap();
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn locate_brew_prefers_path() {
        let executor = MockExecutor::new().with_available(&["brew"]);
        assert_eq!(locate_brew(&executor), Some("brew".into()));
    }
}
