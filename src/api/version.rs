//! Agent version lookup.

use crate::agents::{AgentKind, CONTAINER_SCRIPT_PATH};
use crate::config::AppConfig;
use crate::engine::resolve_cli_cache_dir;
use crate::error::Result;
use crate::process::CommandExecutor;
use crate::version::{ContainerTarget, VersionDetector, VersionOptions};

/// Parameters for detecting an agent CLI version.
pub struct VersionParams<'a, E: mockable::Env, X: CommandExecutor> {
    /// Application configuration (Docker, image and script settings).
    pub config: &'a AppConfig,
    /// Agent to inspect; defaults to the configured agent.
    pub agent: Option<AgentKind>,
    /// Executor that runs the version command.
    pub executor: &'a X,
    /// Tokio runtime handle for blocking execution.
    pub runtime_handle: &'a tokio::runtime::Handle,
    /// Environment snapshot for cache resolution.
    pub env: &'a E,
}

/// Detect the installed version of an agent CLI.
///
/// Docker runs use the wrapper script baked into the image unless a script
/// path is configured. Host runs invoke the CLI directly unless a script path
/// is configured.
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` if Docker is enabled and the CLI
/// cache directory cannot be resolved. Detection failures themselves are not
/// errors; they produce a fallback version string.
pub fn detect_version<E, X>(params: VersionParams<'_, E, X>) -> Result<String>
where
    E: mockable::Env,
    X: CommandExecutor,
{
    let VersionParams {
        config,
        agent,
        executor,
        runtime_handle,
        env,
    } = params;

    let container = if config.docker.enabled {
        Some(ContainerTarget {
            image: String::from(config.image_or_default()),
            cli_cache_dir: resolve_cli_cache_dir(config.docker.cli_cache_dir.as_deref(), env)?,
        })
    } else {
        None
    };
    let script_path = config.agent.script_path.clone().or_else(|| {
        container
            .as_ref()
            .map(|_| camino::Utf8PathBuf::from(CONTAINER_SCRIPT_PATH))
    });
    let options = VersionOptions {
        script_path,
        container,
    };

    let kind = agent.unwrap_or(config.agent.kind);
    let detector = VersionDetector::new(executor);
    Ok(runtime_handle.block_on(detector.detect(kind, &options)))
}
