//! External command execution behind an injectable [`Executor`].
use std::fmt;
use std::process::{Command, Output};

use anyhow::{Context as _, Result};

/// Captured outcome of a finished process.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit status was zero.
    pub success: bool,
    /// Exit code; `None` when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// A program and its arguments, rendered the way a user would type them.
#[derive(Debug, Clone, Copy)]
pub struct CommandLine<'a> {
    program: &'a str,
    args: &'a [&'a str],
}

impl<'a> CommandLine<'a> {
    /// Wrap `program` and `args`.
    #[must_use]
    pub const fn new(program: &'a str, args: &'a [&'a str]) -> Self {
        Self { program, args }
    }
}

impl fmt::Display for CommandLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external programs: package managers, `tar`, `ln`, `sudo`, the
/// Homebrew installer.
pub trait Executor: Send + Sync + fmt::Debug {
    /// Run `program` with extra environment variables and require a zero
    /// exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero;
    /// the message carries the command line and its stderr.
    fn run_with_env(&self, program: &str, args: &[&str], env: &[(&str, &str)])
    -> Result<ExecResult>;

    /// Run `program` and hand back its result whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Whether `program` resolves on `PATH`.
    fn which(&self, program: &str) -> bool;

    /// [`run_with_env`](Self::run_with_env) without extra variables.
    ///
    /// # Errors
    ///
    /// Same as [`run_with_env`](Self::run_with_env).
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.run_with_env(program, args, &[])
    }
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn output(mut command: Command, line: CommandLine<'_>) -> Result<ExecResult> {
        tracing::debug!("$ {line}");
        let output = command
            .output()
            .with_context(|| format!("failed to start `{line}`"))?;
        Ok(ExecResult::from(output))
    }
}

impl Executor for SystemExecutor {
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let line = CommandLine::new(program, args);
        let mut command = Command::new(program);
        command.args(args).envs(env.iter().copied());
        let result = Self::output(command, line)?;
        if !result.success {
            let code = result
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            anyhow::bail!("`{line}` failed (exit {code}): {}", result.stderr.trim());
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut command = Command::new(program);
        command.args(args);
        Self::output(command, CommandLine::new(program, args))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
