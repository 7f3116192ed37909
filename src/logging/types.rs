//! Line styles, task records and the [`Log`] trait.
use std::fmt;

/// `tracing` target of stage headers.
pub const STAGE_TARGET: &str = "dotfiles::stage";
/// `tracing` target of completed-action lines.
pub const SUCCESS_TARGET: &str = "dotfiles::success";
/// `tracing` target of dry-run previews.
pub const DRY_RUN_TARGET: &str = "dotfiles::dry_run";

/// How a log line is rendered on the console and tagged in the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Section header (`==> Install packages`).
    Stage,
    /// Plain progress line.
    Info,
    /// Something was changed.
    Success,
    /// Something would be changed.
    DryRun,
    /// Detail only shown with `--verbose`.
    Debug,
    /// Non-fatal problem.
    Warn,
    /// Fatal problem.
    Error,
}

impl Style {
    /// Recover the style from an event's level and target.
    #[must_use]
    pub fn classify(level: tracing::Level, target: &str) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => match target {
                STAGE_TARGET => Self::Stage,
                SUCCESS_TARGET => Self::Success,
                DRY_RUN_TARGET => Self::DryRun,
                _ => Self::Info,
            },
            _ => Self::Debug,
        }
    }

    /// Colored console line for `msg`.
    #[must_use]
    pub fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::Info => format!("  {msg}"),
            Self::Success => format!("  \x1b[32m✓\x1b[0m {msg}"),
            Self::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
            Self::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
            Self::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        }
    }

    /// Prefix written before the message in the log file.
    #[must_use]
    pub const fn file_tag(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::Info => "    ",
            Self::Success => "    [ok] ",
            Self::DryRun => "    [dry run] ",
            Self::Debug => "    [debug] ",
            Self::Warn => "    [warn] ",
            Self::Error => "    [error] ",
        }
    }
}

/// Outcome of one task, kept for the run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name as shown in the summary.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason or error text.
    pub message: Option<String>,
}

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Ran and applied (or confirmed) its changes.
    Ok,
    /// Had nothing to do with this configuration.
    NotApplicable,
    /// Left out by `--skip`, or declined to act on this host.
    Skipped,
    /// Ran in preview mode.
    DryRun,
    /// Returned an error; the run stopped here.
    Failed,
}

impl TaskStatus {
    /// Summary table marker.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::NotApplicable => "·",
            Self::Skipped => "○",
            Self::DryRun => "~",
            Self::Failed => "✗",
        }
    }

    const fn color(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::NotApplicable => "\x1b[2m",
            Self::Skipped => "\x1b[33m",
            Self::DryRun => "\x1b[37m",
            Self::Failed => "\x1b[31m",
        }
    }
}

impl fmt::Display for TaskEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            self.status.color(),
            self.status.symbol(),
            self.name
        )?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        f.write_str("\x1b[0m")
    }
}

/// Per-status task counts for the summary footer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    /// Tasks that finished [`TaskStatus::Ok`].
    pub ok: u32,
    /// Tasks that were [`TaskStatus::NotApplicable`].
    pub not_applicable: u32,
    /// Tasks that were [`TaskStatus::Skipped`].
    pub skipped: u32,
    /// Tasks that ran as [`TaskStatus::DryRun`].
    pub dry_run: u32,
    /// Tasks that [`TaskStatus::Failed`].
    pub failed: u32,
}

impl StatusCounts {
    /// Count `entries` by status.
    #[must_use]
    pub fn tally(entries: &[TaskEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut counts, entry| {
            let slot = match entry.status {
                TaskStatus::Ok => &mut counts.ok,
                TaskStatus::NotApplicable => &mut counts.not_applicable,
                TaskStatus::Skipped => &mut counts.skipped,
                TaskStatus::DryRun => &mut counts.dry_run,
                TaskStatus::Failed => &mut counts.failed,
            };
            *slot += 1;
            counts
        })
    }

    /// Number of tasks counted.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.ok + self.not_applicable + self.skipped + self.dry_run + self.failed
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks: \x1b[32m{} ok\x1b[0m, \x1b[2m{} n/a\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            self.total(),
            self.ok,
            self.not_applicable,
            self.skipped,
            self.dry_run,
            self.failed
        )
    }
}

/// Sink for progress output and task outcomes.
///
/// Implementors provide [`emit`](Log::emit) and
/// [`record_task`](Log::record_task); the per-style helpers forward to
/// `emit`.
pub trait Log: Send + Sync {
    /// Write one line in `style`.
    fn emit(&self, style: Style, msg: &str);

    /// Remember how a task ended, for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);

    /// Section header.
    fn stage(&self, msg: &str) {
        self.emit(Style::Stage, msg);
    }
    /// Progress line.
    fn info(&self, msg: &str) {
        self.emit(Style::Info, msg);
    }
    /// A change was made.
    fn success(&self, msg: &str) {
        self.emit(Style::Success, msg);
    }
    /// Detail for `--verbose` and the log file.
    fn debug(&self, msg: &str) {
        self.emit(Style::Debug, msg);
    }
    /// Non-fatal problem.
    fn warn(&self, msg: &str) {
        self.emit(Style::Warn, msg);
    }
    /// Fatal problem.
    fn error(&self, msg: &str) {
        self.emit(Style::Error, msg);
    }
    /// A change that dry-run mode held back.
    fn dry_run(&self, msg: &str) {
        self.emit(Style::DryRun, msg);
    }
}
