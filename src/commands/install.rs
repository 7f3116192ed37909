use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::config::{self, Config};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::resources::download::HttpDownloader;
use crate::tasks::{self, Context};

/// Environment variable overriding root auto-detection.
pub const ROOT_ENV: &str = "DOTFILES_ROOT";

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the root or home directory cannot be determined,
/// `provision.toml` is invalid, or any task fails.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("dotfiles-setup {version}"));

    log.stage("Loading configuration");
    let root = resolve_root(cli.root.as_deref())?;
    let home = config::home_dir()?;
    let config = Config::load(&root, &home, cli.mode(), cli.dry_run, cli.skip.clone())?;
    log.info(&format!("root: {}", root.display()));
    log.info(&format!(
        "loaded {} packages, {} links ({} mode)",
        config.packages.len(),
        config.links.len(),
        config.mode
    ));
    report_warnings(&config, log);

    let platform = Platform::detect();
    log.info(&format!("platform: {platform}"));

    let ctx = Context::new(
        Arc::new(config),
        Arc::new(platform),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(SystemExecutor),
        Arc::new(HttpDownloader::new()),
    );
    provision(&ctx, log)
}

/// Run every install task against `ctx`, then print the summary and the
/// follow-up hints.
///
/// # Errors
///
/// Returns the first task error.
pub fn provision(ctx: &Context, log: &Logger) -> Result<()> {
    let all_tasks = tasks::all_install_tasks();
    let outcome = super::run_tasks(all_tasks.iter().map(AsRef::as_ref), ctx, log);

    if ctx.backup.is_used() {
        log.info(&format!("backups: {}", ctx.backup.path().display()));
    }
    if log.has_failures() {
        if let Some(path) = log.log_path() {
            log.error(&format!(
                "{} task(s) failed, full output in {}",
                log.failure_count(),
                path.display()
            ));
        }
    } else if outcome.is_ok() && !ctx.dry_run() {
        print_next_steps(ctx, log);
    }
    outcome
}

fn report_warnings(config: &Config, log: &Logger) {
    let warnings = config.validate();
    if warnings.is_empty() {
        return;
    }
    log.warn(&format!(
        "found {} configuration warning(s):",
        warnings.len()
    ));
    for warning in &warnings {
        log.warn(&format!(
            "  {} [{}]: {}",
            warning.source, warning.item, warning.message
        ));
    }
}

fn print_next_steps(ctx: &Context, log: &Logger) {
    log.stage("Next steps");
    log.info("start `nvim` once to let its plugin manager bootstrap");
    log.info("reload tmux with `tmux source-file ~/.tmux.conf`");
    if ctx.backup.is_used() {
        log.info(&format!(
            "to restore a previous file, move it back from {}",
            ctx.backup.path().display()
        ));
    }
}

/// Whether `dir` looks like a dotfiles checkout.
#[must_use]
pub fn is_dotfiles_root(dir: &Path) -> bool {
    dir.join("nvim").is_dir() || dir.join("tmux/tmux.conf").is_file()
}

/// Resolve the dotfiles root: `--root`, then `DOTFILES_ROOT`, then the
/// binary's location, then the current directory.
///
/// # Errors
///
/// Returns an error if an explicit root does not exist or no candidate
/// looks like a dotfiles checkout.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return dunce::canonicalize(root)
            .with_context(|| format!("--root {} does not exist", root.display()));
    }

    if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
        let root = PathBuf::from(root);
        return dunce::canonicalize(&root)
            .with_context(|| format!("{ROOT_ENV}={} does not exist", root.display()));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        // target/{debug,release}/ → repo root, or a binary placed in the repo.
        for candidate in [parent.join("../.."), parent.to_path_buf()] {
            if is_dotfiles_root(&candidate) {
                return Ok(dunce::canonicalize(&candidate)?);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    if is_dotfiles_root(&cwd) {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine dotfiles root. Use --root or set {ROOT_ENV}");
}
