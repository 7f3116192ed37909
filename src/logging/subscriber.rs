//! The global `tracing` subscriber: colored console lines plus a plain-text
//! run log.
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};

use super::types::Style;
use super::utils::{log_file_path, now, strip_ansi};

/// Pulls the formatted `message` field out of an event.
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

fn read_event(event: &tracing::Event<'_>) -> (Style, String) {
    let metadata = event.metadata();
    let mut message = Message::default();
    event.record(&mut message);
    (
        Style::classify(*metadata.level(), metadata.target()),
        message.0,
    )
}

/// Layer that appends every event to the run log, timestamped and with ANSI
/// codes removed. The file is truncated when the layer is created, so it
/// always holds the latest run.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Open the log for `command` and write the run banner. `None` when the
    /// cache directory is unusable; the run then logs to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?)
    }

    fn at(path: &Path) -> Option<Self> {
        let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        let rule = "=".repeat(48);
        let banner = format!(
            "{rule}\ndotfiles-setup {version}  {}\n{rule}\n",
            now("%Y-%m-%d %H:%M:%S")
        );
        std::fs::write(path, banner).ok()?;
        let file = OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let (style, msg) = read_event(event);
        let line = format!("[{}] {}{}", now("%H:%M:%S"), style.file_tag(), strip_ansi(&msg));
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Renders each event as one styled console line.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let (style, msg) = read_event(event);
        writeln!(writer, "{}", style.console(&msg))
    }
}

/// Install the global subscriber. Call once, before the first log line.
///
/// Warnings and errors go to stderr, everything else to stdout. Debug lines
/// reach the console only with `verbose` (or a `RUST_LOG` override) but are
/// always written to `$XDG_CACHE_HOME/dotfiles/<command>.log`.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::filter::{EnvFilter, LevelFilter};
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;
    use tracing_subscriber::{Layer as _, fmt};

    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);

    let console = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(writer)
        .with_filter(console_filter);
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
}
