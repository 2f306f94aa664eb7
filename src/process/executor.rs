//! Tokio-backed process executor.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use smart_default::SmartDefault;
use tokio::process::Child;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::drain::{CapturedOutput, StreamDrain};
use super::noise::NoiseFilter;
use super::supervisor::{
    ContainerSupervisor, DockerCliSupervisor, cleanup_container, container_name_from_args,
};
use super::termination::{
    UNKNOWN_EXIT_CODE, exit_code_from_spawn_error, exit_code_from_status,
    terminate_with_escalation,
};
use super::{Command, CommandExecutor, CommandResult, ExecuteFuture};

/// Delays governing timeout escalation and output collection.
///
/// These are best-effort bounds, not guarantees about the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SmartDefault)]
pub struct ExecutorTimings {
    /// Delay between the graceful termination signal and the forced kill.
    #[default(Duration::from_millis(1200))]
    pub escalation_delay: Duration,
    /// How long to wait for output streams to close once the process has
    /// exited or been told to stop.
    #[default(Duration::from_millis(1500))]
    pub drain_grace: Duration,
    /// Upper bound for each container stop or remove call.
    #[default(Duration::from_millis(1500))]
    pub cleanup_wait: Duration,
}

/// Runs commands as child processes of the current process.
///
/// Each call owns its child, its two reader tasks and its timer. Concurrent
/// calls share nothing except the supervisor handle and the set of pending
/// container cleanups.
///
/// Cleanup tasks run on the caller's runtime and die with it. Call
/// [`ProcessExecutor::wait_for_cleanup`] before shutting the runtime down.
#[derive(Debug)]
pub struct ProcessExecutor<S: ContainerSupervisor = DockerCliSupervisor> {
    supervisor: Arc<S>,
    timings: ExecutorTimings,
    noise: NoiseFilter,
    cleanups: Mutex<JoinSet<()>>,
}

impl ProcessExecutor<DockerCliSupervisor> {
    /// Create an executor that cleans up containers through the `docker` CLI.
    #[must_use]
    pub fn new() -> Self {
        Self::with_supervisor(DockerCliSupervisor::default())
    }
}

impl Default for ProcessExecutor<DockerCliSupervisor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ContainerSupervisor> ProcessExecutor<S> {
    /// Create an executor with a custom container supervisor.
    #[must_use]
    pub fn with_supervisor(supervisor: S) -> Self {
        Self {
            supervisor: Arc::new(supervisor),
            timings: ExecutorTimings::default(),
            noise: NoiseFilter::default(),
            cleanups: Mutex::new(JoinSet::new()),
        }
    }

    /// Override escalation and grace delays.
    #[must_use]
    pub const fn with_timings(mut self, timings: ExecutorTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Override the output noise filter.
    #[must_use]
    pub fn with_noise_filter(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    /// Return the configured delays.
    #[must_use]
    pub const fn timings(&self) -> ExecutorTimings {
        self.timings
    }

    /// Run a command to completion (async version).
    ///
    /// Never fails: spawn failures, non-zero exits and timeouts are all
    /// reported through the returned [`CommandResult`].
    pub async fn run(&self, command: &Command) -> CommandResult {
        let program = command.program();
        let mut child = match spawn(command) {
            Ok(child) => child,
            Err(error) => {
                warn!(program, %error, "failed to spawn process");
                return CommandResult::new(
                    exit_code_from_spawn_error(&error),
                    String::new(),
                    format!("failed to spawn '{program}': {error}"),
                );
            }
        };
        debug!(program, pid = child.id(), "spawned process");

        let drain = StreamDrain::start(child.stdout.take(), child.stderr.take());

        let Some(limit) = command.timeout() else {
            let waited = child.wait().await;
            return self.finish_exited(program, waited, drain).await;
        };

        match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => self.finish_exited(program, waited, drain).await,
            Err(_) => self.finish_timed_out(command, limit, child, drain).await,
        }
    }

    /// Run a command to completion using a caller runtime handle.
    #[must_use]
    pub fn run_blocking(&self, runtime: &tokio::runtime::Handle, command: &Command) -> CommandResult {
        runtime.block_on(self.run(command))
    }

    /// Wait up to `bound` for scheduled container cleanups to finish.
    ///
    /// Cleanups still running when `bound` elapses are aborted. Returns
    /// `true` when every cleanup finished in time.
    pub async fn wait_for_cleanup(&self, bound: Duration) -> bool {
        let mut pending = std::mem::take(&mut *self.lock_cleanups());
        if pending.is_empty() {
            return true;
        }

        debug!(pending = pending.len(), ?bound, "waiting for container cleanup");
        let drained = tokio::time::timeout(bound, async {
            while pending.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                pending = pending.len(),
                ?bound,
                "container cleanup still running, abandoning it"
            );
            pending.abort_all();
        }
        drained.is_ok()
    }

    fn lock_cleanups(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.cleanups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn finish_exited(
        &self,
        program: &str,
        waited: std::io::Result<std::process::ExitStatus>,
        drain: StreamDrain,
    ) -> CommandResult {
        let exit_code = match waited {
            Ok(status) => exit_code_from_status(status),
            Err(error) => {
                warn!(program, %error, "failed to wait for process");
                UNKNOWN_EXIT_CODE
            }
        };
        let output = drain.finish(self.timings.drain_grace).await;
        debug!(program, exit_code, "process exited");
        let CapturedOutput { stdout, stderr } = output;
        CommandResult::new(exit_code, self.noise.apply(&stdout), self.noise.apply(&stderr))
    }

    async fn finish_timed_out(
        &self,
        command: &Command,
        limit: Duration,
        mut child: Child,
        drain: StreamDrain,
    ) -> CommandResult {
        warn!(program = command.program(), timeout = ?limit, "process timed out, terminating");

        if let Some(container_name) = container_name_from_args(command.args()) {
            info!(container_name, "scheduling container cleanup");
            let mut cleanups = self.lock_cleanups();
            while cleanups.try_join_next().is_some() {}
            cleanups.spawn(cleanup_container(
                Arc::clone(&self.supervisor),
                String::from(container_name),
                self.timings.cleanup_wait,
            ));
        }

        let ((), output) = tokio::join!(
            terminate_with_escalation(&mut child, self.timings.escalation_delay),
            drain.finish(self.timings.drain_grace),
        );

        let CapturedOutput { stdout, stderr } = output;
        CommandResult::timed_out_after(limit, self.noise.apply(&stdout), self.noise.apply(&stderr))
    }
}

impl<S: ContainerSupervisor> CommandExecutor for ProcessExecutor<S> {
    fn execute(&self, command: &Command) -> ExecuteFuture<'_> {
        let owned = command.clone();
        Box::pin(async move { self.run(&owned).await })
    }
}

fn spawn(command: &Command) -> std::io::Result<Child> {
    let mut process = tokio::process::Command::new(command.program());
    process
        .args(command.args().iter().skip(1))
        .envs(command.env())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    process.process_group(0);

    if let Some(dir) = command.working_dir() {
        process.current_dir(dir);
    }

    process.spawn()
}
