use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::config::ProvisionMode;
use crate::error::ProvisionError;
use crate::resources::provisioned_file::ProvisionedFile;
use crate::resources::{Resource, ResourceState};

/// Link or copy the tmux and Neovim configuration into `$HOME`.
#[derive(Debug)]
pub struct ProvisionFiles;

impl Task for ProvisionFiles {
    fn name(&self) -> &'static str {
        "Provision files"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.links.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let config = &ctx.config;
        let (verb, done) = match config.mode {
            ProvisionMode::Link => ("link", "linked"),
            ProvisionMode::Copy => ("copy", "copied"),
        };
        let mut stats = TaskStats::new();

        for link in &config.links {
            let file = ProvisionedFile::new(
                link.source_in(&config.root),
                link.target_in(&config.home),
                config.mode,
                &ctx.backup,
            );

            match file.current_state()? {
                ResourceState::Correct => {
                    ctx.log
                        .debug(&format!("already in place: {}", file.description()));
                    stats.already_ok += 1;
                    continue;
                }
                ResourceState::Invalid { .. } => {
                    return Err(ProvisionError::MissingSource { path: file.source }.into());
                }
                ResourceState::Missing | ResourceState::Incorrect { .. } => {}
            }

            if ctx.dry_run() {
                if file.will_back_up() {
                    ctx.log.dry_run(&format!(
                        "would back up {} to {}",
                        file.target.display(),
                        ctx.backup.destination_for(&file.target).display()
                    ));
                }
                ctx.log.dry_run(&format!(
                    "would {verb} {} -> {}",
                    file.target.display(),
                    file.source.display()
                ));
            } else {
                if let Some(dest) = file.provision()? {
                    ctx.log.info(&format!(
                        "backed up {} to {}",
                        file.target.display(),
                        dest.display()
                    ));
                }
                ctx.log.success(&format!(
                    "{done} {} -> {}",
                    file.target.display(),
                    file.source.display()
                ));
            }
            stats.changed += 1;
        }

        Ok(stats.finish(ctx))
    }
}
