//! Configuration data types for agentbench.

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::agents::{AgentKind, Provider};

/// Container image used when none is configured.
pub const DEFAULT_IMAGE: &str = "agentbench-container";

/// Default execution timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Agent selection and model configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// The agent CLI to benchmark.
    pub kind: AgentKind,

    /// Model identifier passed to the agent CLI.
    pub model: Option<String>,

    /// Model provider. Each agent falls back to its own default when unset.
    pub provider: Option<Provider>,

    /// Override for the wrapper script that launches the agent CLI.
    pub script_path: Option<Utf8PathBuf>,
}

/// Container launch configuration.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Run agents inside a container instead of on the host.
    pub enabled: bool,

    /// Container path where the exercise workspace is mounted.
    #[default(Utf8PathBuf::from("/workspace"))]
    pub workdir: Utf8PathBuf,

    /// Container path where agent logs are written.
    #[default(Utf8PathBuf::from("/root/.local/share/opencode/log"))]
    pub log_mount_target: Utf8PathBuf,

    /// Host directory shared across runs for installed agent CLIs.
    pub cli_cache_dir: Option<Utf8PathBuf>,
}

/// Execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Wall-clock timeout in seconds. Zero disables the timeout.
    #[default(DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Benchmark workspace naming conventions.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Name of the directory that holds per-run workspaces and logs.
    #[default(String::from(".benchwork"))]
    pub benchwork_dir: String,

    /// Suffix stripped from a workspace root name to recover its run id.
    #[default(String::from("-exercism-typescript"))]
    pub run_suffix: String,
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `AGENTBENCH_CONFIG_PATH` environment variable
/// 2. `.agentbench.toml` in the current working directory
/// 3. `.agentbench.toml` in the home directory
/// 4. `~/.config/agentbench/config.toml` (XDG default)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "AGENTBENCH",
    post_merge_hook,
    discovery(
        app_name = "agentbench",
        env_var = "AGENTBENCH_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".agentbench.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The container image used for Docker runs.
    pub image: Option<String>,

    /// Agent configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub agent: AgentConfig,

    /// Container launch configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub docker: DockerConfig,

    /// Execution limits.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub execution: ExecutionConfig,

    /// Workspace naming conventions.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub workspace: WorkspaceConfig,
}

impl AppConfig {
    /// Return the configured image, or [`DEFAULT_IMAGE`].
    #[must_use]
    pub fn image_or_default(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_IMAGE)
    }

    /// Return the configured timeout. Zero means no timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<std::time::Duration> {
        match self.execution.timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }

    /// Treat blank strings from any layer as unset. Idempotent.
    pub fn normalize(&mut self) {
        self.image = self.image.take().filter(|image| !image.trim().is_empty());
        self.agent.model = self
            .agent
            .model
            .take()
            .filter(|model| !model.trim().is_empty());
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.normalize();
        Ok(())
    }
}
