pub mod install;

use anyhow::Result;

use crate::logging::{Logger, TaskStatus};
use crate::tasks::{self, Context, Task};

/// Whether `name` matches any `--skip` keyword (case-insensitive substring).
#[must_use]
pub fn is_skipped(name: &str, skip: &[String]) -> bool {
    let name = name.to_lowercase();
    skip.iter()
        .any(|keyword| !keyword.is_empty() && name.contains(&keyword.to_lowercase()))
}

/// Execute tasks in order, stopping at the first failure, then print the
/// summary.
///
/// # Errors
///
/// Returns the first task error.
pub fn run_tasks<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let outcome = run_until_failure(tasks, ctx);
    log.print_summary();
    outcome
}

fn run_until_failure<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
) -> Result<()> {
    for task in tasks {
        if is_skipped(task.name(), &ctx.config.skip) {
            ctx.log.debug(&format!("skipping task: {}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some("skipped by --skip"));
            continue;
        }
        tasks::execute(task, ctx)?;
    }
    Ok(())
}
