//! Command-line argument definitions for agentbench.

use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser, Subcommand};

use crate::agents::{AgentKind, Provider};

/// Command-line interface for agentbench.
#[derive(Debug, Parser)]
#[command(name = "agentbench")]
#[command(
    author,
    version,
    about = "Benchmark harness that runs AI coding-agent CLIs against fixed exercises"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container image to use for Docker runs.
    #[arg(long, global = true)]
    pub image: Option<String>,

    /// Run agents inside a container.
    #[arg(long, global = true)]
    pub docker: bool,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run an agent against one exercise.
    Run(RunArgs),

    /// Print the version of an agent CLI.
    Version(VersionArgs),

    /// Run an arbitrary command through the process executor.
    Exec(ExecArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Debug, Parser)]
#[command(group(
    ArgGroup::new("prompt")
        .required(true)
        .args(["instructions", "instructions_file"]),
))]
pub struct RunArgs {
    /// Exercise directory, relative to the current directory.
    #[arg(long, required = true)]
    pub exercise: Utf8PathBuf,

    /// Instructions passed to the agent.
    #[arg(long)]
    pub instructions: Option<String>,

    /// File containing the instructions passed to the agent.
    #[arg(long)]
    pub instructions_file: Option<Utf8PathBuf>,

    /// Agent CLI to run.
    #[arg(long, value_enum)]
    pub agent: Option<AgentKind>,

    /// Model identifier.
    #[arg(long)]
    pub model: Option<String>,

    /// Model provider.
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Source file the agent may edit. Repeatable.
    #[arg(long = "source-file")]
    pub source_files: Vec<String>,

    /// Test file mounted read-only in Docker runs. Repeatable.
    #[arg(long = "test-file")]
    pub test_files: Vec<String>,

    /// Timeout in seconds. Zero disables the timeout.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the `version` subcommand.
#[derive(Debug, Parser)]
pub struct VersionArgs {
    /// Agent CLI to inspect.
    #[arg(long, value_enum)]
    pub agent: Option<AgentKind>,
}

/// Arguments for the `exec` subcommand.
#[derive(Debug, Parser)]
pub struct ExecArgs {
    /// Timeout in seconds. Zero disables the timeout.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Command to execute.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
