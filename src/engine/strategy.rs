//! Execution strategies: run a command on the host or wrap it in `docker run`.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::Result;
use crate::process::Command;
use crate::sanitize::sanitize_path_segment;

use super::args::{
    DOCKER_BASE_ARGS, cli_cache_args, ensure_dir, environment_args, resolve_cli_cache_dir,
    workspace_args,
};
use super::naming::container_name;

/// Host directory name used for logs when the workspace layout is unknown.
const FALLBACK_LOG_DIR: &str = "opencode-logs";

/// Where a command is prepared to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareContext {
    /// Directory the exercise path is relative to.
    pub cwd: Utf8PathBuf,
    /// Exercise directory, relative to `cwd`.
    pub exercise_path: Utf8PathBuf,
    /// Test files, relative to the exercise directory.
    pub test_files: Vec<String>,
}

impl PrepareContext {
    /// Absolute host path of the exercise workspace.
    #[must_use]
    pub fn workspace(&self) -> Utf8PathBuf {
        self.cwd.join(&self.exercise_path)
    }
}

/// Turns a logical command into the command actually executed.
pub trait ExecutionStrategy: Send + Sync {
    /// Prepare `core` for execution in `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prepared argument vector is invalid.
    fn prepare(&self, core: &Command, context: &PrepareContext) -> Result<Command>;
}

/// Runs the command directly on the host inside the exercise directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExecutionStrategy;

impl ExecutionStrategy for LocalExecutionStrategy {
    fn prepare(&self, core: &Command, context: &PrepareContext) -> Result<Command> {
        Ok(core.clone().with_working_dir(Some(context.workspace())))
    }
}

/// Wraps the command in a `docker run` invocation.
///
/// The prepared command carries no environment overlay: variables reach the
/// container through explicit `-e` flags only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerExecutionStrategy {
    image: String,
    workdir: Utf8PathBuf,
    log_mount_target: Utf8PathBuf,
    cli_cache_dir: Utf8PathBuf,
    benchwork_dir: String,
    run_suffix: String,
}

impl DockerExecutionStrategy {
    /// Build the strategy from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the CLI cache directory cannot be resolved.
    pub fn from_config<E: mockable::Env>(config: &AppConfig, env: &E) -> Result<Self> {
        let cli_cache_dir = resolve_cli_cache_dir(config.docker.cli_cache_dir.as_deref(), env)?;
        Ok(Self {
            image: String::from(config.image_or_default()),
            workdir: config.docker.workdir.clone(),
            log_mount_target: config.docker.log_mount_target.clone(),
            cli_cache_dir,
            benchwork_dir: config.workspace.benchwork_dir.clone(),
            run_suffix: config.workspace.run_suffix.clone(),
        })
    }

    /// Image the command runs in.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Host directory bound to the container's log directory.
    ///
    /// A workspace laid out as `<benchwork>/<run>-<suffix>/exercises/practice/<name>`
    /// logs to `<benchwork>/<run>/logs/opencode`; anything else logs to
    /// `<cwd>/<benchwork>/opencode-logs`.
    #[must_use]
    pub fn log_dir(&self, context: &PrepareContext) -> Utf8PathBuf {
        let workspace = context.workspace();
        let mut ancestors = workspace.ancestors().skip(3);
        let structured = ancestors.next().zip(ancestors.next()).and_then(|(root, benchwork)| {
            (benchwork.file_name() == Some(self.benchwork_dir.as_str())).then(|| {
                let root_name = root.file_name().unwrap_or_default();
                let run_id = root_name
                    .strip_suffix(self.run_suffix.as_str())
                    .unwrap_or(root_name);
                benchwork
                    .join(sanitize_path_segment(run_id))
                    .join("logs")
                    .join("opencode")
            })
        });

        structured.unwrap_or_else(|| {
            context
                .cwd
                .join(&self.benchwork_dir)
                .join(FALLBACK_LOG_DIR)
        })
    }

    fn test_mount_args(&self, workspace: &Utf8Path, test_files: &[String]) -> Vec<String> {
        test_files
            .iter()
            .flat_map(|file| {
                [
                    String::from("-v"),
                    format!("{}:{}:ro", workspace.join(file), self.workdir.join(file)),
                ]
            })
            .collect()
    }
}

impl ExecutionStrategy for DockerExecutionStrategy {
    fn prepare(&self, core: &Command, context: &PrepareContext) -> Result<Command> {
        let workspace = context.workspace();
        let log_dir = self.log_dir(context);
        ensure_dir(&log_dir);

        let name = container_name(&workspace);
        debug!(container_name = %name, %workspace, "preparing container launch");

        let mut args: Vec<String> = DOCKER_BASE_ARGS.iter().copied().map(String::from).collect();
        args.extend([String::from("--name"), name, String::from("--init")]);
        args.extend(cli_cache_args(&self.cli_cache_dir));
        args.extend(environment_args(core.env()));
        args.extend(workspace_args(&workspace, &self.workdir));
        args.extend([
            String::from("-v"),
            format!("{log_dir}:{}", self.log_mount_target),
        ]);
        args.extend(self.test_mount_args(&workspace, &context.test_files));
        args.push(self.image.clone());
        args.extend(core.args().iter().cloned());

        Ok(Command::new(args)?.with_timeout(core.timeout()))
    }
}
