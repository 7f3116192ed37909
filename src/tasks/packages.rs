use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::config::packages::{PackageSource, PackageSpec, specs_for};
use crate::error::ProvisionError;
use crate::resources::Resource;
use crate::resources::download::Checksum;
use crate::resources::package::{
    HOMEBREW_INSTALL_URL, Installer, PackageManager, PackageResource, Privilege, locate_brew,
};
use crate::resources::release::ReleaseArchiveResource;

/// Install git, tmux and neovim with the host's package manager.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let family = ctx.platform.family;
        let Some(manager) = PackageManager::for_family(family) else {
            ctx.log
                .warn(&ProvisionError::EnvironmentUnrecognized { family }.to_string());
            return Ok(TaskResult::Skipped(format!(
                "no package manager for {}",
                ctx.platform
            )));
        };
        ctx.log
            .debug(&format!("using {manager} on {}", ctx.platform));

        let mut installer = Installer::new(manager, Privilege::Root);
        let brew_present = if manager == PackageManager::Brew {
            match ensure_homebrew(ctx)? {
                Some(path) => {
                    installer = installer.with_brew(&path);
                    true
                }
                None => false,
            }
        } else {
            true
        };

        let specs = specs_for(family, &ctx.config.packages);
        let mut stats = TaskStats::new();
        let mut pending_native: Vec<&PackageSpec> = Vec::new();
        let mut pending_release: Vec<&PackageSpec> = Vec::new();

        for spec in &specs {
            let installed = brew_present && is_installed(ctx, &installer, spec)?;
            if installed {
                ctx.log.debug(&format!("{} already installed", spec.name));
                stats.already_ok += 1;
            } else if matches!(spec.source, PackageSource::Native) {
                pending_native.push(spec);
            } else {
                pending_release.push(spec);
            }
        }

        if pending_native.is_empty() && pending_release.is_empty() {
            return Ok(stats.finish(ctx));
        }

        if ctx.dry_run() {
            for spec in pending_native.iter().chain(&pending_release) {
                ctx.log
                    .dry_run(&format!("would install {} ({})", spec.name, source_label(spec, manager)));
                stats.changed += 1;
            }
            return Ok(stats.finish(ctx));
        }

        if manager.needs_root() {
            installer.privilege = Privilege::resolve(&*ctx.executor, manager)?;
            ctx.log
                .debug(&format!("privilege strategy: {:?}", installer.privilege));
        }

        if !pending_native.is_empty() {
            let names: Vec<&str> = pending_native
                .iter()
                .map(|s| s.native_name.as_str())
                .collect();
            ctx.log
                .info(&format!("installing with {manager}: {}", names.join(" ")));
            installer.install(&*ctx.executor, &names)?;
            ctx.log.success(&format!("installed {}", names.join(" ")));
            stats.changed += u32::try_from(names.len()).unwrap_or(u32::MAX);
        }

        for spec in pending_release {
            let PackageSource::ReleaseArchive(archive) = &spec.source else {
                continue;
            };
            ctx.log
                .info(&format!("downloading {} from {}", spec.name, archive.url));
            let resource = ReleaseArchiveResource::new(
                archive,
                installer.privilege,
                &*ctx.executor,
                &*ctx.downloader,
            );
            match resource.install()? {
                Checksum::Verified => ctx.log.debug("checksum verified"),
                Checksum::Unavailable(reason) => ctx.log.warn(&format!(
                    "could not download checksum list ({reason}); skipping verification"
                )),
                Checksum::Unlisted => ctx.log.warn(&format!(
                    "{} is not listed in the checksum file; skipping verification",
                    archive.file_name
                )),
            }
            ctx.log.success(&format!(
                "installed {} to {}",
                spec.name,
                resource.installed_binary().display()
            ));
            stats.changed += 1;
        }

        Ok(stats.finish(ctx))
    }
}

fn source_label(spec: &PackageSpec, manager: PackageManager) -> String {
    match &spec.source {
        PackageSource::Native => manager.to_string(),
        PackageSource::ReleaseArchive(archive) => format!("release archive {}", archive.file_name),
    }
}

fn is_installed(ctx: &Context, installer: &Installer, spec: &PackageSpec) -> Result<bool> {
    match &spec.source {
        PackageSource::Native => {
            PackageResource::new(spec.native_name.clone(), installer, &*ctx.executor)
                .needs_change()
                .map(|needed| !needed)
        }
        PackageSource::ReleaseArchive(archive) => ReleaseArchiveResource::new(
            archive,
            installer.privilege,
            &*ctx.executor,
            &*ctx.downloader,
        )
        .needs_change()
        .map(|needed| !needed),
    }
}

/// Return the `brew` program to use, installing Homebrew when absent.
///
/// Returns `None` only in dry-run mode when Homebrew is not installed.
fn ensure_homebrew(ctx: &Context) -> Result<Option<PathBuf>> {
    if let Some(path) = locate_brew(&*ctx.executor) {
        return Ok(Some(path));
    }

    if ctx.dry_run() {
        ctx.log
            .dry_run(&format!("would install Homebrew from {HOMEBREW_INSTALL_URL}"));
        return Ok(None);
    }

    ctx.log.info("Homebrew not found, installing");
    let script = ctx.downloader.fetch_text(HOMEBREW_INSTALL_URL)?;
    ctx.executor
        .run_with_env("/bin/bash", &["-c", &script], &[("NONINTERACTIVE", "1")])
        .map_err(|e| ProvisionError::PackageManager {
            manager: "brew".to_string(),
            packages: "homebrew".to_string(),
            reason: format!("{e:#}"),
        })?;

    let path = locate_brew(&*ctx.executor).ok_or_else(|| ProvisionError::PackageManager {
        manager: "brew".to_string(),
        packages: "homebrew".to_string(),
        reason: "brew not found after installation".to_string(),
    })?;
    ctx.log.success("installed Homebrew");
    Ok(Some(path))
}
