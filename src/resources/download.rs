//! HTTP downloads with bounded retries and SHA-256 verification.
use std::io::Read as _;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::error::ProvisionError;

/// Number of download attempts.
const RETRY_COUNT: u32 = 3;

/// Seconds to wait between download attempts.
const RETRY_DELAY: u64 = 2;

/// TCP connect timeout in seconds.
const CONNECT_TIMEOUT: u64 = 10;

/// Total transfer timeout in seconds.
const TRANSFER_TIMEOUT: u64 = 300;

/// Abstraction over network fetches so resources can be tested offline.
pub trait Downloader: Send + Sync + std::fmt::Debug {
    /// Fetch `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Download`] after all attempts fail.
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch `url` into the file at `dest`, replacing it.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Download`] after all attempts fail.
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`Downloader`] backed by a shared `ureq` agent.
pub struct HttpDownloader {
    agent: ureq::Agent,
    retry_delay: Duration,
}

impl std::fmt::Debug for HttpDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDownloader")
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDownloader {
    /// Create a downloader with the default timeouts.
    #[must_use]
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT)))
            .timeout_global(Some(Duration::from_secs(TRANSFER_TIMEOUT)))
            .build()
            .into();
        Self {
            agent,
            retry_delay: Duration::from_secs(RETRY_DELAY),
        }
    }

    fn with_retries<T>(&self, url: &str, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
        let mut last_error = String::new();
        for n in 1..=RETRY_COUNT {
            if n > 1 {
                tracing::debug!("retry {n}/{RETRY_COUNT} for {url} after {last_error}");
                std::thread::sleep(self.retry_delay);
            }
            match attempt() {
                Ok(value) => return Ok(value),
                Err(e) => last_error = format!("{e:#}"),
            }
        }
        Err(ProvisionError::Download {
            url: url.to_string(),
            reason: format!("{last_error} (after {RETRY_COUNT} attempts)"),
        }
        .into())
    }
}

impl Downloader for HttpDownloader {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.with_retries(url, || {
            let response = self.agent.get(url).call()?;
            let mut body = String::new();
            response.into_body().into_reader().read_to_string(&mut body)?;
            Ok(body)
        })
    }

    fn fetch_to(&self, url: &str, dest: &Path) -> Result<()> {
        self.with_retries(url, || {
            let response = self.agent.get(url).call()?;
            let mut reader = response.into_body().into_reader();
            let mut file = std::fs::File::create(dest)?;
            std::io::copy(&mut reader, &mut file)?;
            Ok(())
        })
    }
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns [`ProvisionError::Filesystem`] if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let mut file =
        std::fs::File::open(path).map_err(|e| ProvisionError::fs("checksum", path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| ProvisionError::fs("checksum", path, e))?;
    let mut hex = String::with_capacity(64);
    for b in &hasher.finalize() {
        // write! to a String is infallible.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Outcome of checking a download against a published checksum list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checksum {
    /// The digest matched the published value.
    Verified,
    /// The checksum list could not be fetched.
    Unavailable(String),
    /// The list has no entry for the file.
    Unlisted,
}

/// Look up `file_name` in a `<hex>  <name>` checksum list.
#[must_use]
pub fn expected_digest<'a>(list: &'a str, file_name: &str) -> Option<&'a str> {
    list.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?.trim_start_matches('*');
        (name == file_name).then_some(digest)
    })
}

/// Verify `path` against the checksum list at `checksum_url`.
///
/// A missing list or entry is not an error; the caller decides whether to
/// warn.
///
/// # Errors
///
/// Returns [`ProvisionError::Download`] when the digest does not match, after
/// removing the downloaded file.
pub fn verify_checksum(
    downloader: &dyn Downloader,
    checksum_url: &str,
    file_name: &str,
    path: &Path,
) -> Result<Checksum> {
    let list = match downloader.fetch_text(checksum_url) {
        Ok(list) => list,
        Err(e) => return Ok(Checksum::Unavailable(format!("{e:#}"))),
    };

    let Some(expected) = expected_digest(&list, file_name) else {
        return Ok(Checksum::Unlisted);
    };

    let actual = compute_sha256(path)?;
    if !expected.eq_ignore_ascii_case(&actual) {
        let _ = std::fs::remove_file(path);
        return Err(ProvisionError::Download {
            url: checksum_url.to_string(),
            reason: format!("checksum mismatch for {file_name}: expected {expected}, got {actual}"),
        }
        .into());
    }
    Ok(Checksum::Verified)
}
