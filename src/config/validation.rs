//! Non-fatal configuration checks reported before any task runs.
use std::path::Path;

use super::links::LinkSpec;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Configuration section (e.g. `"links"`, `"packages"`).
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a new warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Check link entries for problems that would surface later as failures.
#[must_use]
pub fn validate_links(links: &[LinkSpec], root: &Path) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for link in links {
        let item = link.source.display().to_string();

        if !link.source_in(root).exists() {
            warnings.push(ValidationWarning::new(
                "links",
                &item,
                format!("source does not exist in {}", root.display()),
            ));
        }

        if link.target.is_absolute() {
            warnings.push(ValidationWarning::new(
                "links",
                &item,
                "target should be relative to $HOME",
            ));
        }

        if link.target.as_os_str().is_empty() {
            warnings.push(ValidationWarning::new("links", &item, "target is empty"));
        }
    }

    warnings
}

/// Check package names for empty or duplicated entries.
#[must_use]
pub fn validate_packages(packages: &[String]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for name in packages {
        if name.trim().is_empty() {
            warnings.push(ValidationWarning::new("packages", name, "empty package name"));
        } else if !seen.insert(name.as_str()) {
            warnings.push(ValidationWarning::new("packages", name, "listed more than once"));
        }
    }

    warnings
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn existing_sources_produce_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tmux")).unwrap();
        std::fs::write(dir.path().join("tmux/tmux.conf"), "").unwrap();
        let links = vec![LinkSpec::new("tmux/tmux.conf", ".tmux.conf")];
        assert!(validate_links(&links, dir.path()).is_empty());
    }

    #[test]
    fn missing_source_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let links = vec![LinkSpec::new("nvim", ".config/nvim")];
        let warnings = validate_links(&links, dir.path());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].source, "links");
        assert_eq!(warnings[0].item, "nvim");
        assert!(warnings[0].message.contains("does not exist"));
    }

    #[test]
    fn absolute_target_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nvim")).unwrap();
        let links = vec![LinkSpec::new("nvim", "/etc/nvim")];
        let warnings = validate_links(&links, dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("relative"));
    }

    #[test]
    fn duplicate_and_empty_packages_are_reported() {
        let packages = vec![
            "git".to_string(),
            "git".to_string(),
            " ".to_string(),
            "tmux".to_string(),
        ];
        let warnings = validate_packages(&packages);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].item, "git");
        assert_eq!(warnings[1].message, "empty package name");
    }
}
