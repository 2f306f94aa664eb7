//! Orchestration API for agentbench commands.
//!
//! This module provides public orchestration functions for each agentbench
//! command: [`run_agent`], [`exec`] and [`detect_version`]. These functions
//! hold the business logic behind the CLI binary, making it available to both
//! the CLI adapter and library embedders.
//!
//! All functions accept library-owned types (not clap types) and return data.
//! They do not print to stdout/stderr or call `std::process::exit`.

mod exec;
mod run;
mod version;

pub use exec::{ExecParams, exec};
pub use run::{RunParams, read_instructions, run_agent};
pub use version::{VersionParams, detect_version};

use crate::process::{CommandResult, TIMEOUT_EXIT_CODE};

/// Outcome of an agentbench command.
///
/// Commands return outright success, a command-specific exit code, or a
/// timeout. The CLI adapter maps each to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed successfully (exit code 0).
    Success,
    /// The command completed but the underlying process exited with a
    /// non-zero code.
    CommandExit {
        /// The exit code reported by the process.
        code: i32,
    },
    /// The command was killed after exceeding its timeout.
    TimedOut,
}

impl CommandOutcome {
    /// Classify a finished command.
    ///
    /// A process that exits with 124 on its own is a [`Self::CommandExit`];
    /// only an executor-enforced timeout is [`Self::TimedOut`].
    #[must_use]
    pub const fn from_result(result: &CommandResult) -> Self {
        if result.timed_out() {
            Self::TimedOut
        } else if result.exit_code() == 0 {
            Self::Success
        } else {
            Self::CommandExit {
                code: result.exit_code(),
            }
        }
    }

    /// Process exit code the CLI should report.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::CommandExit { code } => code,
            Self::TimedOut => TIMEOUT_EXIT_CODE,
        }
    }
}

/// A classified outcome together with the captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Classification of the run.
    pub outcome: CommandOutcome,
    /// Exit code and captured output.
    pub result: CommandResult,
}

impl From<CommandResult> for RunReport {
    fn from(result: CommandResult) -> Self {
        Self {
            outcome: CommandOutcome::from_result(&result),
            result,
        }
    }
}
