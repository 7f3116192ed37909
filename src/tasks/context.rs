use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::backup::BackupDir;
use crate::resources::download::Downloader;

/// Everything a task needs for one provisioning run.
///
/// Built once by the install command and shared read-only by every task.
/// The host-facing handles (`executor`, `downloader`) are trait objects so
/// tests can run tasks without touching packages or the network.
pub struct Context {
    /// Resolved run configuration.
    pub config: Arc<Config>,
    /// Host OS family.
    pub platform: Arc<Platform>,
    /// Progress output and task table.
    pub log: Arc<dyn Log>,
    /// Runs package managers and helper commands.
    pub executor: Arc<dyn Executor>,
    /// Fetches the Homebrew installer and release archives.
    pub downloader: Arc<dyn Downloader>,
    /// Where displaced files go.
    pub backup: Arc<BackupDir>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("executor", &self.executor)
            .field("downloader", &self.downloader)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Context whose backup directory is named after the current local time.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        let backup = BackupDir::for_now(&config.backup_root(), &config.home);
        Self {
            config,
            platform,
            log,
            executor,
            downloader,
            backup: Arc::new(backup),
        }
    }

    /// Use `backup` instead of the time-stamped default.
    #[must_use]
    pub fn with_backup(self, backup: BackupDir) -> Self {
        Self {
            backup: Arc::new(backup),
            ..self
        }
    }

    /// Whether changes are only reported.
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.config.dry_run
    }
}
