//! External process execution and lifecycle.
//!
//! This module launches a command (bare or containerised), drains both output
//! streams concurrently, enforces an optional wall-clock timeout with
//! escalating termination, and performs best-effort cleanup of named
//! containers that outlive a timed-out `docker run`.
//!
//! Ordinary process failures never surface as errors. A non-zero exit, a
//! timeout, or a failure to spawn all produce a [`CommandResult`], so a
//! benchmark run always yields a uniform result shape.
//!
//! Execution sits behind the [`CommandExecutor`] trait seam so consumers such
//! as version detection can be unit-tested without spawning processes.

mod drain;
mod executor;
mod noise;
mod supervisor;
mod termination;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{BenchError, ConfigError};

pub use executor::{ExecutorTimings, ProcessExecutor};
pub use noise::NoiseFilter;
pub use supervisor::{
    CleanupFuture, ContainerSupervisor, DockerCliSupervisor, container_name_from_args,
};

/// Exit code reported when a command is killed for exceeding its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Boxed future type returned by [`CommandExecutor::execute`].
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;

/// Behaviour required to run a [`Command`] to completion.
///
/// Implementations must fold every process-level failure into the returned
/// [`CommandResult`] rather than panicking or hanging.
pub trait CommandExecutor: Send + Sync {
    /// Run `command` and capture its exit code and output.
    fn execute(&self, command: &Command) -> ExecuteFuture<'_>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn execute(&self, command: &Command) -> ExecuteFuture<'_> {
        (**self).execute(command)
    }
}

/// An immutable command invocation.
///
/// `args` is never empty and its first element names the executable. The
/// environment map is overlaid on the inherited process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<String>,
    env: BTreeMap<String, String>,
    timeout: Option<Duration>,
    working_dir: Option<Utf8PathBuf>,
}

impl Command {
    /// Create a command from its argument vector.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when `args` is empty, and
    /// `ConfigError::InvalidValue` when the executable is blank.
    pub fn new<I, S>(args: I) -> Result<Self, BenchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let validated = validate_args(args.into_iter().map(Into::into).collect())?;
        Ok(Self {
            args: validated,
            env: BTreeMap::new(),
            timeout: None,
            working_dir: None,
        })
    }

    /// Replace the environment overlay.
    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Set the wall-clock timeout.
    ///
    /// `None` and zero durations both mean "no timeout".
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|limit| !limit.is_zero());
        self
    }

    /// Set the working directory the process starts in.
    #[must_use]
    pub fn with_working_dir(mut self, working_dir: Option<Utf8PathBuf>) -> Self {
        self.working_dir = working_dir;
        self
    }

    /// Return the full argument vector.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Return the executable name.
    #[must_use]
    pub fn program(&self) -> &str {
        self.args.first().map_or("", String::as_str)
    }

    /// Return the environment overlay.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Return the timeout, if one is configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Return the working directory, if one is configured.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.working_dir.as_deref()
    }
}

/// Outcome of running a [`Command`].
///
/// The exit code is always concrete. [`TIMEOUT_EXIT_CODE`] together with
/// [`CommandResult::timed_out`] distinguishes a timeout kill from a process
/// that exits with 124 on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    exit_code: i32,
    stdout: String,
    stderr: String,
    timed_out: bool,
}

impl CommandResult {
    /// Create a result for a process that ran to completion.
    #[must_use]
    pub const fn new(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            timed_out: false,
        }
    }

    /// Create a result for a process killed after exceeding `timeout`.
    ///
    /// The timeout diagnostic is appended to `stderr` on its own line.
    #[must_use]
    pub fn timed_out_after(timeout: Duration, stdout: String, stderr: String) -> Self {
        let message = format!(
            "Execution timed out after {} seconds",
            timeout.as_secs_f64()
        );
        let combined = if stderr.is_empty() {
            message
        } else {
            format!("{stderr}\n{message}")
        };
        Self {
            exit_code: TIMEOUT_EXIT_CODE,
            stdout,
            stderr: combined,
            timed_out: true,
        }
    }

    /// Return the process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Return captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Return captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Return whether the process was killed by the timeout.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Return whether the process exited with code zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

fn validate_args(args: Vec<String>) -> Result<Vec<String>, BenchError> {
    let Some(executable) = args.first() else {
        return Err(BenchError::from(ConfigError::MissingRequired {
            field: String::from("command"),
        }));
    };

    if executable.trim().is_empty() {
        return Err(BenchError::from(ConfigError::InvalidValue {
            field: String::from("command"),
            reason: String::from("command executable must not be empty"),
        }));
    }

    Ok(args)
}
