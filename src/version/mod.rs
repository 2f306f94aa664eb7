//! Agent CLI version detection.
//!
//! Runs `<cli> --version` (optionally through the wrapper script and inside a
//! container) and extracts a semantic version from the output. Detection never
//! fails: a failed command yields [`FALLBACK_VERSION`] and unparseable output
//! yields [`UNKNOWN_VERSION`].

use std::sync::LazyLock;

use camino::Utf8PathBuf;
use regex::Regex;
use tracing::{debug, warn};

use crate::agents::AgentKind;
use crate::engine::{DOCKER_BASE_ARGS, cli_cache_args};
use crate::process::{Command, CommandExecutor};

#[cfg(test)]
mod tests;

/// Reported when the version command exits unsuccessfully.
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Reported when the output contains no digits at all.
pub const UNKNOWN_VERSION: &str = "unknown";

#[expect(clippy::expect_used, reason = "static regex pattern is known to be valid")]
static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("semver pattern"));

#[expect(clippy::expect_used, reason = "static regex pattern is known to be valid")]
static MAJOR_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)").expect("major.minor pattern"));

#[expect(clippy::expect_used, reason = "static regex pattern is known to be valid")]
static MAJOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("major pattern"));

/// Container the version command runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTarget {
    /// Image to run.
    pub image: String,
    /// Host CLI cache mounted into the container.
    pub cli_cache_dir: Utf8PathBuf,
}

/// How the version command is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOptions {
    /// Wrapper script; when unset the CLI is invoked directly.
    pub script_path: Option<Utf8PathBuf>,
    /// Run inside this container instead of on the host.
    pub container: Option<ContainerTarget>,
}

/// Detects agent CLI versions through a [`CommandExecutor`].
pub struct VersionDetector<X: CommandExecutor> {
    executor: X,
}

impl<X: CommandExecutor> VersionDetector<X> {
    /// Create a detector that runs commands through `executor`.
    #[must_use]
    pub const fn new(executor: X) -> Self {
        Self { executor }
    }

    /// Detect the installed version of `kind`.
    pub async fn detect(&self, kind: AgentKind, options: &VersionOptions) -> String {
        let args = version_args(kind, options);
        let command = match Command::new(args) {
            Ok(command) => command,
            Err(error) => {
                warn!(agent = %kind, %error, "invalid version command");
                return String::from(FALLBACK_VERSION);
            }
        };

        let result = self.executor.execute(&command).await;
        if !result.is_success() {
            let stderr = result.stderr().trim();
            warn!(
                agent = %kind,
                exit_code = result.exit_code(),
                stderr = if stderr.is_empty() { "unknown error" } else { stderr },
                "failed to detect agent version"
            );
            return String::from(FALLBACK_VERSION);
        }

        let version = parse_version(kind, result.stdout());
        debug!(agent = %kind, %version, "detected agent version");
        version
    }
}

/// Argument vector for the version command.
#[must_use]
pub fn version_args(kind: AgentKind, options: &VersionOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(target) = &options.container {
        args.extend(DOCKER_BASE_ARGS.iter().copied().map(String::from));
        args.extend(cli_cache_args(&target.cli_cache_dir));
        args.push(target.image.clone());
    }
    if let Some(script) = &options.script_path {
        args.push(String::from("bash"));
        args.push(script.to_string());
    }
    args.push(String::from(kind.cli_name()));
    args.push(String::from("--version"));
    args
}

/// Extract a version from `--version` output.
///
/// A version following the agent's own name wins, so banners that mention a
/// runtime version first still resolve correctly. Otherwise the first
/// `x.y.z` is taken, then `x.y` (as `x.y.0`), then `x` (as `x.0.0`).
#[must_use]
pub fn parse_version(kind: AgentKind, output: &str) -> String {
    let clean = output.trim();
    version_prefix(kind)
        .and_then(|prefix| prefixed_version(prefix, clean))
        .unwrap_or_else(|| generic_version(clean))
}

const fn version_prefix(kind: AgentKind) -> Option<&'static str> {
    match kind {
        AgentKind::Claude => Some("claude-code"),
        AgentKind::Cursor => None,
        other => Some(other.as_str()),
    }
}

fn prefixed_version(prefix: &str, output: &str) -> Option<String> {
    let pattern = format!(r"(?i){}\s+v?(\d+\.\d+\.\d+)", regex::escape(prefix));
    let regex = Regex::new(&pattern).ok()?;
    regex
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|found| String::from(found.as_str()))
}

fn generic_version(output: &str) -> String {
    if let Some(found) = SEMVER.find(output) {
        return String::from(found.as_str());
    }
    if let Some(found) = MAJOR_MINOR.find(output) {
        return format!("{}.0", found.as_str());
    }
    MAJOR.find(output).map_or_else(
        || String::from(UNKNOWN_VERSION),
        |found| format!("{}.0.0", found.as_str()),
    )
}
