//! The run's [`Logger`]: emits `tracing` events and keeps the task table.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{
    DRY_RUN_TARGET, Log, STAGE_TARGET, SUCCESS_TARGET, StatusCounts, Style, TaskEntry, TaskStatus,
};
use super::utils::log_file_path;

/// Logger for one command run.
///
/// Lines become [`tracing`] events that the subscriber from
/// [`init_subscriber`](super::init_subscriber) renders; task outcomes are
/// kept in memory for [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`; the log file path is shown in the summary.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Where the file layer writes this run's log.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the recorded task outcomes, in run order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| Vec::new(), |tasks| tasks.clone())
    }

    /// Number of tasks recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |tasks| {
            tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Whether any task failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Print one line per recorded task, the status counts and the log path.
    pub fn print_summary(&self) {
        let entries = self.task_entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &entries {
            self.info(&entry.to_string());
        }
        self.info(&StatusCounts::tally(&entries).to_string());
        if let Some(path) = self.log_path() {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn emit(&self, style: Style, msg: &str) {
        match style {
            Style::Stage => tracing::info!(target: STAGE_TARGET, "{msg}"),
            Style::Success => tracing::info!(target: SUCCESS_TARGET, "{msg}"),
            Style::DryRun => tracing::info!(target: DRY_RUN_TARGET, "{msg}"),
            Style::Info => tracing::info!("{msg}"),
            Style::Debug => tracing::debug!("{msg}"),
            Style::Warn => tracing::warn!("{msg}"),
            Style::Error => tracing::error!("{msg}"),
        }
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
