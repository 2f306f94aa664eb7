//! Docker CLI argument fragments.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::warn;

use crate::env::non_blank;
use crate::error::{ConfigError, Result};

/// Leading arguments for every container launch.
pub const DOCKER_BASE_ARGS: [&str; 4] = ["docker", "run", "--rm", "-i"];

/// Container path where installed agent CLIs are cached.
pub const CLI_CACHE_CONTAINER_PATH: &str = "/root/.local";

/// Environment variable overriding the host CLI cache directory.
pub const CLI_CACHE_ENV: &str = "AGENTBENCH_CLI_CACHE";

/// Mount `host` read-write at `workdir` and make it the working directory.
#[must_use]
pub fn workspace_args(host: &Utf8Path, workdir: &Utf8Path) -> Vec<String> {
    vec![
        String::from("-v"),
        format!("{host}:{workdir}"),
        String::from("-w"),
        workdir.to_string(),
    ]
}

/// Explicit `-e KEY=VALUE` flags. Empty values are skipped so nothing is
/// passed through implicitly from the host.
#[must_use]
pub fn environment_args(env: &BTreeMap<String, String>) -> Vec<String> {
    env.iter()
        .filter(|(_, value)| !value.is_empty())
        .flat_map(|(key, value)| [String::from("-e"), format!("{key}={value}")])
        .collect()
}

/// Mount the host CLI cache at [`CLI_CACHE_CONTAINER_PATH`].
#[must_use]
pub fn cli_cache_args(dir: &Utf8Path) -> Vec<String> {
    vec![
        String::from("-v"),
        format!("{dir}:{CLI_CACHE_CONTAINER_PATH}"),
    ]
}

/// Resolve the host CLI cache directory and make sure it exists.
///
/// Resolution order: `configured`, then [`CLI_CACHE_ENV`], then
/// `$HOME/.cache/agentbench/cli`. A directory that cannot be created is
/// logged and returned anyway; Docker reports an unusable mount itself.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRequired`] when nothing is configured and
/// `HOME` is unset.
pub fn resolve_cli_cache_dir<E: mockable::Env>(
    configured: Option<&Utf8Path>,
    env: &E,
) -> Result<Utf8PathBuf> {
    let dir = match configured {
        Some(path) => path.to_path_buf(),
        None => match non_blank(env, CLI_CACHE_ENV) {
            Some(explicit) => Utf8PathBuf::from(explicit),
            None => {
                let home = non_blank(env, "HOME").ok_or_else(|| ConfigError::MissingRequired {
                    field: String::from("docker.cli_cache_dir"),
                })?;
                Utf8PathBuf::from(home)
                    .join(".cache")
                    .join("agentbench")
                    .join("cli")
            }
        },
    };
    ensure_dir(&dir);
    Ok(dir)
}

/// Create `dir` and its parents. Failures are logged, never returned.
pub(crate) fn ensure_dir(dir: &Utf8Path) {
    if let Err(error) = Dir::create_ambient_dir_all(dir, ambient_authority()) {
        warn!(path = %dir, %error, "failed to create directory");
    }
}
