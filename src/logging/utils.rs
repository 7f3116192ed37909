//! Log file location, ANSI stripping and timestamps.
use std::path::PathBuf;

/// Directory under the user cache that holds the run logs.
const LOG_DIR: &str = "dotfiles";

/// Remove ANSI escapes from `s`: CSI sequences (`ESC [ … final`) and
/// two-byte escapes such as `ESC M` or `ESC 7`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some((before, escape)) = rest.split_once('\x1b') {
        out.push_str(before);
        rest = escape.strip_prefix('[').map_or_else(
            || {
                let mut chars = escape.chars();
                chars.next();
                chars.as_str()
            },
            |csi| {
                csi.find(|c: char| ('@'..='~').contains(&c))
                    .and_then(|end| csi.get(end + 1..))
                    .unwrap_or("")
            },
        );
    }
    out.push_str(rest);
    out
}

/// `$XDG_CACHE_HOME/dotfiles`, falling back to `$HOME/.cache/dotfiles`.
/// Created on demand.
pub(super) fn log_dir() -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let dir = cache.join(LOG_DIR);
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Log file for `command`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    log_dir().map(|dir| dir.join(format!("{command}.log")))
}

/// Current local time rendered with `format`.
pub(super) fn now(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}
