//! Named tasks that orchestrate resource changes.
mod context;
pub mod files;
pub mod packages;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Result of a single task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped (not applicable to this host).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for tasks that process many items.
///
/// # Examples
///
/// ```
/// use dotfiles_setup::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 2, already_ok: 1 };
/// assert_eq!(stats.summary(false), "2 changed, 1 already ok");
/// assert_eq!(stats.summary(true), "2 would change, 1 already ok");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "2 changed, 1 already ok").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        format!("{} {verb}, {} already ok", self.changed, self.already_ok)
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run()));
        if ctx.dry_run() {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

/// One step of the install command.
pub trait Task: Send + Sync {
    /// Name shown in stage headers and the summary; `--skip` matches it.
    fn name(&self) -> &str;

    /// Whether the configuration gives this task anything to do.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if an install command, download or filesystem
    /// operation fails.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The tasks run by the install command, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(packages::InstallPackages),
        Box::new(files::ProvisionFiles),
    ]
}

/// Run `task` if it applies and record its outcome in the summary table.
///
/// # Errors
///
/// Returns the task's error once it has been recorded as failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    let name = task.name();
    if !task.should_run(ctx) {
        ctx.log.debug(&format!("{name}: nothing configured"));
        ctx.log.record_task(name, TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(name);
    let (status, note) = match task.run(ctx) {
        Ok(TaskResult::Ok) => (TaskStatus::Ok, None),
        Ok(TaskResult::DryRun) => (TaskStatus::DryRun, None),
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            (TaskStatus::Skipped, Some(reason))
        }
        Err(e) => {
            let detail = format!("{e:#}");
            ctx.log.error(&format!("{name}: {detail}"));
            ctx.log.record_task(name, TaskStatus::Failed, Some(&detail));
            return Err(e);
        }
    };
    ctx.log.record_task(name, status, note.as_deref());
    Ok(())
}

/// Shared helpers for task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use crate::config::{Config, LinkSpec, ProvisionMode};
    use crate::exec::Executor;
    use crate::logging::{Log, Logger};
    use crate::platform::{OsFamily, Platform};
    use crate::resources::backup::BackupDir;
    use crate::resources::download::Downloader;
    use crate::resources::download::test_helpers::StubDownloader;

    use super::Context;

    /// Build a [`Config`] with no packages or links.
    #[must_use]
    pub fn empty_config(root: &Path, home: &Path) -> Config {
        Config {
            root: root.to_path_buf(),
            home: home.to_path_buf(),
            mode: ProvisionMode::Link,
            dry_run: false,
            packages: Vec::new(),
            links: Vec::new(),
            skip: Vec::new(),
        }
    }

    /// A config with one package and the tmux link.
    #[must_use]
    pub fn sample_config(root: &Path, home: &Path) -> Config {
        Config {
            packages: vec!["git".to_string()],
            links: vec![LinkSpec::new("tmux/tmux.conf", ".tmux.conf")],
            ..empty_config(root, home)
        }
    }

    /// Build a [`Context`] for `family`, returning the logger so tests can
    /// inspect recorded task state.
    #[must_use]
    pub fn make_context(
        config: Config,
        family: OsFamily,
        executor: Arc<dyn Executor>,
        downloader: Arc<dyn Downloader>,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("test"));
        let backup = BackupDir::new(&config.backup_root(), &config.home, "20240101_000000");
        let ctx = Context::new(
            Arc::new(config),
            Arc::new(Platform::new(family, false)),
            Arc::clone(&log) as Arc<dyn Log>,
            executor,
            downloader,
        )
        .with_backup(backup);
        (ctx, log)
    }

    /// Build a [`Context`] with an offline downloader.
    #[must_use]
    pub fn make_offline_context(
        config: Config,
        family: OsFamily,
        executor: Arc<dyn Executor>,
    ) -> (Context, Arc<Logger>) {
        make_context(config, family, executor, Arc::new(StubDownloader::default()))
    }

    /// Temporary repo with `tmux/tmux.conf` and `nvim/init.lua`, plus a home.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn sandbox() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("repo");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("tmux")).unwrap();
        std::fs::write(root.join("tmux/tmux.conf"), "set -g mouse on\n").unwrap();
        std::fs::create_dir_all(root.join("nvim")).unwrap();
        std::fs::write(root.join("nvim/init.lua"), "vim.g.mapleader = ' '\n").unwrap();
        std::fs::create_dir_all(&home).unwrap();
        (tmp, root, home)
    }
}
