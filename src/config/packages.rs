//! Required packages and their per-family install source.
use crate::platform::OsFamily;

/// Logical names installed when `provision.toml` does not override them.
pub const DEFAULT_PACKAGES: &[&str] = &["git", "tmux", "neovim"];

/// Release channel for the Neovim prebuilt archives.
const NEOVIM_RELEASE_BASE: &str = "https://github.com/neovim/neovim/releases/latest/download";

/// A prebuilt release archive installed outside the package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArchive {
    /// Archive download URL.
    pub url: String,
    /// URL of the published SHA-256 list (`<hex>  <file>` lines).
    pub checksum_url: String,
    /// File name of the archive, as it appears in the checksum list.
    pub file_name: String,
    /// Directory the archive extracts to, under the install prefix.
    pub extracted_dir: String,
    /// Binary name exposed on `PATH`.
    pub binary: String,
}

impl ReleaseArchive {
    /// Neovim release archive for the compiled architecture.
    #[must_use]
    pub fn neovim() -> Self {
        let arch = if cfg!(target_arch = "aarch64") {
            "arm64"
        } else {
            "x86_64"
        };
        let stem = format!("nvim-linux-{arch}");
        let file_name = format!("{stem}.tar.gz");
        Self {
            url: format!("{NEOVIM_RELEASE_BASE}/{file_name}"),
            checksum_url: format!("{NEOVIM_RELEASE_BASE}/shasum.txt"),
            file_name,
            extracted_dir: stem,
            binary: "nvim".to_string(),
        }
    }
}

/// Where a package comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Installed through the family's package manager.
    Native,
    /// Downloaded from an upstream release.
    ReleaseArchive(ReleaseArchive),
}

/// A required package resolved for one OS family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Logical name (`git`, `tmux`, `neovim`).
    pub name: String,
    /// Name understood by the family's package manager.
    pub native_name: String,
    /// Install source.
    pub source: PackageSource,
}

impl PackageSpec {
    fn native(name: &str, native_name: &str) -> Self {
        Self {
            name: name.to_string(),
            native_name: native_name.to_string(),
            source: PackageSource::Native,
        }
    }
}

/// Resolve logical package names for `family`.
///
/// Every family ships `git`, `tmux` and `neovim` under those names. On
/// Debian, `neovim` is taken from the upstream release archive instead of
/// the distribution package.
#[must_use]
pub fn specs_for(family: OsFamily, names: &[String]) -> Vec<PackageSpec> {
    names
        .iter()
        .map(|name| match (family, name.as_str()) {
            (OsFamily::Debian, "neovim") => PackageSpec {
                name: name.clone(),
                native_name: "neovim".to_string(),
                source: PackageSource::ReleaseArchive(ReleaseArchive::neovim()),
            },
            _ => PackageSpec::native(name, name),
        })
        .collect()
}

/// Built-in package list as owned strings.
#[must_use]
pub fn default_packages() -> Vec<String> {
    DEFAULT_PACKAGES.iter().map(ToString::to_string).collect()
}
