//! Best-effort cleanup of containers orphaned by a timed-out `docker run`.
//!
//! The supervisor holds no registry. The container name is read back out of
//! the launch arguments, where the execution strategy placed it.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::ContainerError;

/// Boxed future type returned by [`ContainerSupervisor`] operations.
pub type CleanupFuture = Pin<Box<dyn Future<Output = Result<(), ContainerError>> + Send>>;

/// Behaviour required to stop and remove a container by name.
///
/// Both operations are best-effort. Callers bound them with a timeout and
/// discard their errors.
pub trait ContainerSupervisor: Send + Sync + 'static {
    /// Stop (kill) the named container.
    fn stop_container(&self, container_name: &str) -> CleanupFuture;

    /// Force-remove the named container.
    fn remove_container(&self, container_name: &str) -> CleanupFuture;
}

/// Supervisor that shells out to the container engine CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCliSupervisor {
    program: String,
}

impl DockerCliSupervisor {
    /// Create a supervisor driving the given engine binary (`docker`, `podman`).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Return the engine binary this supervisor invokes.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, container_name: &str, args: &[&str]) -> CleanupFuture {
        let program = self.program.clone();
        let name = String::from(container_name);
        let full_args: Vec<String> = args
            .iter()
            .map(|arg| String::from(*arg))
            .chain(std::iter::once(name.clone()))
            .collect();

        Box::pin(async move {
            let output = tokio::process::Command::new(&program)
                .args(&full_args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|error| ContainerError::CleanupFailed {
                    container_name: name.clone(),
                    message: format!("failed to run {program}: {error}"),
                })?;

            if output.status.success() {
                return Ok(());
            }

            Err(ContainerError::CleanupFailed {
                container_name: name,
                message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        })
    }
}

impl Default for DockerCliSupervisor {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerSupervisor for DockerCliSupervisor {
    fn stop_container(&self, container_name: &str) -> CleanupFuture {
        self.run(container_name, &["kill"])
    }

    fn remove_container(&self, container_name: &str) -> CleanupFuture {
        self.run(container_name, &["rm", "-f"])
    }
}

/// Return the container name from a `docker run ... --name <name> ...` argv.
///
/// Returns `None` unless the first two tokens are `docker run` and a name
/// flag (`--name <name>` or `--name=<name>`) is present with a non-empty
/// value.
#[must_use]
pub fn container_name_from_args(args: &[String]) -> Option<&str> {
    let [engine, subcommand, rest @ ..] = args else {
        return None;
    };
    if engine != "docker" || subcommand != "run" {
        return None;
    }

    let mut tokens = rest.iter();
    while let Some(token) = tokens.next() {
        if token == "--name" {
            return tokens
                .next()
                .map(String::as_str)
                .filter(|name| !name.is_empty());
        }
        if let Some(name) = token.strip_prefix("--name=") {
            return Some(name).filter(|value| !value.is_empty());
        }
    }
    None
}

/// Stop and then remove `container_name`, each bounded by `wait`.
///
/// Failures and timeouts are logged and swallowed.
pub(super) async fn cleanup_container<S: ContainerSupervisor + ?Sized>(
    supervisor: Arc<S>,
    container_name: String,
    wait: Duration,
) {
    let stopped = bounded(supervisor.stop_container(&container_name), &container_name, wait).await;
    log_cleanup_failure("stop", stopped);

    let removed = bounded(
        supervisor.remove_container(&container_name),
        &container_name,
        wait,
    )
    .await;
    log_cleanup_failure("remove", removed);
}

async fn bounded(
    operation: CleanupFuture,
    container_name: &str,
    wait: Duration,
) -> Result<(), ContainerError> {
    tokio::time::timeout(wait, operation)
        .await
        .unwrap_or_else(|_| {
            Err(ContainerError::CleanupTimeout {
                container_name: String::from(container_name),
                millis: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            })
        })
}

fn log_cleanup_failure(step: &str, result: Result<(), ContainerError>) {
    if let Err(error) = result {
        debug!(step, %error, "container cleanup step failed");
    }
}
