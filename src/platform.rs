//! Host OS family and container detection.
use std::fmt;
use std::path::Path;

/// Release marker files consulted when os-release is absent or unhelpful.
const RELEASE_MARKERS: &[(&str, OsFamily)] = &[
    ("/etc/debian_version", OsFamily::Debian),
    ("/etc/fedora-release", OsFamily::Fedora),
    ("/etc/redhat-release", OsFamily::Fedora),
    ("/etc/arch-release", OsFamily::Arch),
    ("/etc/alpine-release", OsFamily::Alpine),
];

/// Files whose presence means the process runs inside a container.
const CONTAINER_MARKERS: &[&str] = &["/.dockerenv", "/run/.containerenv"];

/// Substrings of `/proc/1/cgroup` that identify a container runtime.
const CGROUP_HINTS: &[&str] = &["docker", "containerd", "kubepods", "lxc", "podman"];

/// Coarse classification of the host OS, used to pick a package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// macOS (Homebrew).
    MacOs,
    /// Debian, Ubuntu and derivatives (apt).
    Debian,
    /// Fedora, RHEL and derivatives (dnf).
    Fedora,
    /// Arch Linux and derivatives (pacman).
    Arch,
    /// Alpine Linux (apk).
    Alpine,
    /// A Linux distribution that could not be classified.
    Linux,
    /// Anything else.
    Unknown,
}

impl OsFamily {
    /// Every family, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::MacOs,
        Self::Debian,
        Self::Fedora,
        Self::Arch,
        Self::Alpine,
        Self::Linux,
        Self::Unknown,
    ];

    /// Classify a single os-release `ID` / `ID_LIKE` token.
    fn from_release_id(id: &str) -> Option<Self> {
        match id {
            "debian" | "ubuntu" | "linuxmint" | "pop" | "raspbian" | "elementary" | "kali" => {
                Some(Self::Debian)
            }
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" | "amzn" => Some(Self::Fedora),
            "arch" | "manjaro" | "endeavouros" | "garuda" | "artix" => Some(Self::Arch),
            "alpine" | "postmarketos" => Some(Self::Alpine),
            _ => None,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MacOs => "macos",
            Self::Debian => "debian",
            Self::Fedora => "fedora",
            Self::Arch => "arch",
            Self::Alpine => "alpine",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Raw host observations that feed [`Platform::from_signals`].
///
/// Kept separate from detection so classification stays a pure function that
/// tests can drive with arbitrary inputs.
#[derive(Debug, Clone, Default)]
pub struct HostSignals {
    /// Compile-time OS identifier (`std::env::consts::OS`).
    pub os: String,
    /// Contents of `/etc/os-release`, if readable.
    pub os_release: Option<String>,
    /// Release marker files that exist on this host.
    pub release_markers: Vec<String>,
    /// Whether a container marker file exists.
    pub container_marker: bool,
    /// Contents of `/proc/1/cgroup`, if readable.
    pub cgroup: Option<String>,
    /// Whether the `container` environment variable is set.
    pub container_env: bool,
}

impl HostSignals {
    /// Read the signals from the running host.
    #[must_use]
    pub fn probe() -> Self {
        let os = std::env::consts::OS.to_string();
        if os != "linux" {
            return Self {
                os,
                ..Self::default()
            };
        }

        Self {
            os,
            os_release: std::fs::read_to_string("/etc/os-release").ok(),
            release_markers: RELEASE_MARKERS
                .iter()
                .filter(|(path, _)| Path::new(path).exists())
                .map(|(path, _)| (*path).to_string())
                .collect(),
            container_marker: CONTAINER_MARKERS.iter().any(|p| Path::new(p).exists()),
            cgroup: std::fs::read_to_string("/proc/1/cgroup").ok(),
            container_env: std::env::var_os("container").is_some(),
        }
    }
}

/// Platform information for the current host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Detected OS family.
    pub family: OsFamily,
    /// Whether the process runs inside a container.
    pub in_container: bool,
}

impl Platform {
    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(family: OsFamily, in_container: bool) -> Self {
        Self {
            family,
            in_container,
        }
    }

    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_signals(&HostSignals::probe())
    }

    /// Classify a set of host signals. Never fails: unrecognized input
    /// degrades to [`OsFamily::Linux`] or [`OsFamily::Unknown`].
    #[must_use]
    pub fn from_signals(signals: &HostSignals) -> Self {
        let family = match signals.os.as_str() {
            "macos" => OsFamily::MacOs,
            "linux" => classify_linux(signals),
            _ => OsFamily::Unknown,
        };

        let in_container = signals.container_marker
            || signals.container_env
            || signals
                .cgroup
                .as_deref()
                .is_some_and(|c| CGROUP_HINTS.iter().any(|hint| c.contains(hint)));

        Self {
            family,
            in_container,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_container {
            write!(f, "{} (container)", self.family)
        } else {
            write!(f, "{}", self.family)
        }
    }
}

fn classify_linux(signals: &HostSignals) -> OsFamily {
    if let Some(contents) = &signals.os_release {
        let (id, id_like) = parse_os_release(contents);
        let from_release = id
            .iter()
            .chain(id_like.iter())
            .find_map(|token| OsFamily::from_release_id(token));
        if let Some(family) = from_release {
            return family;
        }
    }

    RELEASE_MARKERS
        .iter()
        .find(|(path, _)| signals.release_markers.iter().any(|m| m == path))
        .map_or(OsFamily::Linux, |(_, family)| *family)
}

/// Extract the `ID` value and the `ID_LIKE` tokens from os-release contents.
///
/// Values are lowercased with surrounding quotes removed.
fn parse_os_release(contents: &str) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut id_like = Vec::new();

    for line in contents.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        match key.trim() {
            "ID" => id = Some(value.to_lowercase()),
            "ID_LIKE" => {
                id_like = value.split_whitespace().map(str::to_lowercase).collect();
            }
            _ => {}
        }
    }

    (id, id_like)
}
