//! Agent run orchestration.

use std::io::ErrorKind;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::info;

use crate::agents::{AgentBuilder, AgentSettings, FileList};
use crate::config::AppConfig;
use crate::engine::{
    DockerExecutionStrategy, ExecutionStrategy, LocalExecutionStrategy, PrepareContext,
};
use crate::error::{FilesystemError, Result};
use crate::process::CommandExecutor;

use super::RunReport;

/// Parameters for running an agent against one exercise.
///
/// Groups the arguments required by [`run_agent`] into a single struct to
/// satisfy the "no more than four parameters" convention.
pub struct RunParams<'a, E: mockable::Env, X: CommandExecutor> {
    /// Application configuration (agent, Docker and timeout settings).
    pub config: &'a AppConfig,
    /// Directory the exercise path is relative to.
    pub cwd: &'a Utf8Path,
    /// Exercise directory.
    pub exercise: &'a Utf8Path,
    /// Instructions passed to the agent.
    pub instructions: &'a str,
    /// Files the agent is told about.
    pub files: &'a FileList,
    /// Executor that runs the prepared command.
    pub executor: &'a X,
    /// Tokio runtime handle for blocking execution.
    pub runtime_handle: &'a tokio::runtime::Handle,
    /// Environment snapshot for API keys and cache resolution.
    pub env: &'a E,
}

/// Run an agent against one exercise.
///
/// Validates the exercise directory, builds the agent command, applies the
/// configured timeout, prepares it for the host or a container, and runs it.
///
/// # Errors
///
/// Returns `BenchError` variants:
/// - `FilesystemError::NotFound` if the exercise directory does not exist.
/// - `ConfigError::MissingRequired` if no model is configured.
/// - `AgentError` if a required API key is missing or the provider is not
///   supported by the agent.
///
/// A failing, crashing or timed-out agent is not an error; it is reported
/// through the returned [`RunReport`].
pub fn run_agent<E, X>(params: RunParams<'_, E, X>) -> Result<RunReport>
where
    E: mockable::Env,
    X: CommandExecutor,
{
    let RunParams {
        config,
        cwd,
        exercise,
        instructions,
        files,
        executor,
        runtime_handle,
        env,
    } = params;

    let context = PrepareContext {
        cwd: cwd.to_path_buf(),
        exercise_path: exercise.to_path_buf(),
        test_files: files.test_files.clone(),
    };
    ensure_directory(&context.workspace())?;

    let settings = AgentSettings::from_config(config, cwd)?;
    let command = AgentBuilder::new(&settings, env)
        .build_command(instructions, files)?
        .with_timeout(config.timeout());

    let strategy: Box<dyn ExecutionStrategy> = if config.docker.enabled {
        Box::new(DockerExecutionStrategy::from_config(config, env)?)
    } else {
        Box::new(LocalExecutionStrategy)
    };
    let prepared = strategy.prepare(&command, &context)?;

    info!(
        agent = %settings.kind,
        model = %settings.model,
        docker = config.docker.enabled,
        exercise = %exercise,
        "running agent"
    );
    let result = runtime_handle.block_on(executor.execute(&prepared));
    info!(exit_code = result.exit_code(), timed_out = result.timed_out(), "agent finished");

    Ok(RunReport::from(result))
}

/// Read instructions from a file.
///
/// # Errors
///
/// Returns `FilesystemError::NotFound` if the file does not exist, or
/// `FilesystemError::IoError` if it cannot be read.
pub fn read_instructions(path: &Utf8Path) -> Result<String> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|error| filesystem_error(path, &error))?;
    let content = dir
        .read_to_string(file_name)
        .map_err(|error| filesystem_error(path, &error))?;
    Ok(content)
}

fn ensure_directory(path: &Utf8Path) -> Result<()> {
    Dir::open_ambient_dir(path, ambient_authority())
        .map(drop)
        .map_err(|error| filesystem_error(path, &error).into())
}

fn filesystem_error(path: &Utf8Path, error: &std::io::Error) -> FilesystemError {
    if error.kind() == ErrorKind::NotFound {
        FilesystemError::NotFound {
            path: path.as_std_path().to_path_buf(),
        }
    } else {
        FilesystemError::IoError {
            path: path.as_std_path().to_path_buf(),
            message: error.to_string(),
        }
    }
}
