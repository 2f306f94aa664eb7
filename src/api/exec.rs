//! Arbitrary command execution.
//!
//! Runs a caller-supplied command through the same executor the agent runs
//! use, so timeout handling and output capture can be exercised directly.

use camino::Utf8Path;
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::process::{Command, CommandExecutor};

use super::RunReport;

/// Parameters for executing an arbitrary command.
pub struct ExecParams<'a, X: CommandExecutor> {
    /// Application configuration (provides the timeout).
    pub config: &'a AppConfig,
    /// Command argv to execute.
    pub command: Vec<String>,
    /// Working directory, or the current directory when unset.
    pub working_dir: Option<&'a Utf8Path>,
    /// Executor that runs the command.
    pub executor: &'a X,
    /// Tokio runtime handle for blocking execution.
    pub runtime_handle: &'a tokio::runtime::Handle,
}

/// Execute a command and classify its outcome.
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` if `command` is empty, or
/// `ConfigError::InvalidValue` if the executable name is blank.
pub fn exec<X: CommandExecutor>(params: ExecParams<'_, X>) -> Result<RunReport> {
    let ExecParams {
        config,
        command,
        working_dir,
        executor,
        runtime_handle,
    } = params;

    let prepared = Command::new(command)?
        .with_timeout(config.timeout())
        .with_working_dir(working_dir.map(Utf8Path::to_path_buf));

    info!(program = prepared.program(), "executing command");
    let result = runtime_handle.block_on(executor.execute(&prepared));

    Ok(RunReport::from(result))
}
