//! Escalating termination and exit-status mapping.
//!
//! Children are spawned as process-group leaders, so signals go to the whole
//! group. Shell wrappers and the grandchildren they start release the output
//! pipes together instead of keeping them open after the leader dies.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::debug;

/// Exit code reported when the executable does not exist.
pub(super) const SPAWN_NOT_FOUND_EXIT_CODE: i32 = 127;
/// Exit code reported when the executable cannot be run.
pub(super) const SPAWN_NOT_EXECUTABLE_EXIT_CODE: i32 = 126;
/// Exit code reported for every other spawn failure.
pub(super) const SPAWN_FAILED_EXIT_CODE: i32 = -1;
/// Exit code reported when the exit status cannot be determined.
pub(super) const UNKNOWN_EXIT_CODE: i32 = -1;

/// Ask the process group to stop, then kill it if it outlives `escalation_delay`.
///
/// The child is always reaped before this returns.
pub(super) async fn terminate_with_escalation(child: &mut Child, escalation_delay: Duration) {
    signal_group(child, GroupSignal::Terminate);

    if let Ok(waited) = tokio::time::timeout(escalation_delay, child.wait()).await {
        log_wait_failure(waited.err());
        return;
    }

    debug!(?escalation_delay, "graceful termination ignored, killing process group");
    signal_group(child, GroupSignal::Kill);
    if let Err(error) = child.start_kill() {
        debug!(%error, "kill request failed");
    }
    log_wait_failure(child.wait().await.err());
}

/// Map a wait status onto a shell-style exit code.
///
/// Signal deaths become `128 + signal` on Unix.
pub(super) fn exit_code_from_status(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| signal_exit_code(status))
        .unwrap_or(UNKNOWN_EXIT_CODE)
}

/// Map a spawn error onto a shell-style exit code.
pub(super) fn exit_code_from_spawn_error(error: &io::Error) -> i32 {
    match error.kind() {
        io::ErrorKind::NotFound => SPAWN_NOT_FOUND_EXIT_CODE,
        io::ErrorKind::PermissionDenied => SPAWN_NOT_EXECUTABLE_EXIT_CODE,
        _ => SPAWN_FAILED_EXIT_CODE,
    }
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|signal| 128_i32.saturating_add(signal))
}

#[cfg(not(unix))]
const fn signal_exit_code(_status: ExitStatus) -> Option<i32> {
    None
}

#[derive(Debug, Clone, Copy)]
enum GroupSignal {
    Terminate,
    Kill,
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: GroupSignal) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // `id` is `None` once the child has been reaped.
    let Some(raw_pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    let nix_signal = match signal {
        GroupSignal::Terminate => Signal::SIGTERM,
        GroupSignal::Kill => Signal::SIGKILL,
    };
    if let Err(errno) = killpg(Pid::from_raw(raw_pid), nix_signal) {
        debug!(pid = raw_pid, signal = nix_signal.as_str(), %errno, "failed to signal process group");
    }
}

#[cfg(not(unix))]
fn signal_group(child: &mut Child, _signal: GroupSignal) {
    if let Err(error) = child.start_kill() {
        debug!(%error, "kill request failed");
    }
}

fn log_wait_failure(error: Option<io::Error>) {
    if let Some(wait_error) = error {
        debug!(error = %wait_error, "failed to reap child process");
    }
}
