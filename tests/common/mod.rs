// Shared helpers for integration tests.
//
// Provides a temporary dotfiles checkout plus an isolated home directory, and
// host-free stand-ins for the executor and downloader so tests never install
// packages or touch the network.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use dotfiles_setup::config::{Config, ProvisionMode};
use dotfiles_setup::exec::{ExecResult, Executor};
use dotfiles_setup::logging::{Log, Logger};
use dotfiles_setup::platform::{OsFamily, Platform};
use dotfiles_setup::resources::backup::BackupDir;
use dotfiles_setup::resources::download::Downloader;
use dotfiles_setup::tasks::Context;

/// Contents of the fixture `tmux/tmux.conf`.
pub const TMUX_CONF: &str = "set -g mouse on\n";

/// Executor that reports every command as succeeding without running it.
#[derive(Debug, Default)]
pub struct NoopExecutor;

impl Executor for NoopExecutor {
    fn run_with_env(
        &self,
        _program: &str,
        _args: &[&str],
        _env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        Ok(ok())
    }

    fn run_unchecked(&self, _program: &str, _args: &[&str]) -> Result<ExecResult> {
        Ok(ok())
    }

    fn which(&self, _program: &str) -> bool {
        true
    }
}

fn ok() -> ExecResult {
    ExecResult {
        stdout: String::new(),
        stderr: String::new(),
        success: true,
        code: Some(0),
    }
}

/// Downloader that refuses every request.
#[derive(Debug, Default)]
pub struct OfflineDownloader;

impl Downloader for OfflineDownloader {
    fn fetch_text(&self, url: &str) -> Result<String> {
        anyhow::bail!("offline: {url}")
    }

    fn fetch_to(&self, url: &str, _dest: &Path) -> Result<()> {
        anyhow::bail!("offline: {url}")
    }
}

/// A dotfiles checkout and a home directory inside one [`tempfile::TempDir`].
///
/// Everything is deleted when the context is dropped.
pub struct IntegrationTestContext {
    tmp: tempfile::TempDir,
    /// Repository root containing `tmux/` and `nvim/`.
    pub root: PathBuf,
    /// Isolated `$HOME`.
    pub home: PathBuf,
}

impl IntegrationTestContext {
    /// Create a checkout with `tmux/tmux.conf` and `nvim/init.lua`, plus an
    /// empty home.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("tmux")).expect("create tmux dir");
        std::fs::write(root.join("tmux/tmux.conf"), TMUX_CONF).expect("write tmux.conf");
        std::fs::create_dir_all(root.join("nvim/lua")).expect("create nvim dir");
        std::fs::write(root.join("nvim/init.lua"), "require('options')\n").expect("write init.lua");
        std::fs::write(root.join("nvim/lua/options.lua"), "vim.o.number = true\n")
            .expect("write options.lua");
        std::fs::create_dir_all(&home).expect("create home");
        Self { tmp, root, home }
    }

    /// Write `content` to `relative` under the home directory.
    pub fn with_home_file(self, relative: &str, content: &str) -> Self {
        let path = self.home.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create home file parent");
        }
        std::fs::write(path, content).expect("write home file");
        self
    }

    /// Write `provision.toml` into the checkout.
    pub fn with_provision_toml(self, content: &str) -> Self {
        std::fs::write(self.root.join("provision.toml"), content).expect("write provision.toml");
        self
    }

    /// Load configuration the way the install command does.
    pub fn config(&self, mode: ProvisionMode) -> Config {
        Config::load(&self.root, &self.home, mode, false, Vec::new()).expect("load config")
    }

    /// Build a task context for `config` on `family`, with a backup directory
    /// stamped `stamp`.
    pub fn context(&self, config: Config, family: OsFamily, stamp: &str) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("integration-test"));
        let backup = BackupDir::new(&config.backup_root(), &self.home, stamp);
        let ctx = Context::new(
            Arc::new(config),
            Arc::new(Platform::new(family, false)),
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::new(NoopExecutor),
            Arc::new(OfflineDownloader),
        )
        .with_backup(backup);
        (ctx, log)
    }

    /// Entries under `~/.dotfiles_backup`, sorted by name.
    pub fn backup_dirs(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.home.join(".dotfiles_backup")) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = entries
            .map(|e| e.expect("read backup entry").path())
            .collect();
        dirs.sort();
        dirs
    }

    /// Path of the temporary directory holding both trees.
    pub fn tmp_path(&self) -> &Path {
        self.tmp.path()
    }
}
