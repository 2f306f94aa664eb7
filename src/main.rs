//! `agentbench` application entry point.
//!
//! This binary runs AI coding-agent CLIs against benchmark exercises. It uses
//! `eyre` for opaque error handling at the application boundary, converting
//! domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/agentbench/config.toml` or path from
//!    `AGENTBENCH_CONFIG_PATH`)
//! 3. Environment variables (`AGENTBENCH_*`)
//! 4. Command-line arguments

use std::process::ExitCode;

use agentbench::agents::FileList;
use agentbench::api::{
    ExecParams, RunParams, RunReport, VersionParams, detect_version, exec, read_instructions,
    run_agent,
};
use agentbench::config::{AppConfig, Cli, Commands, ExecArgs, RunArgs, VersionArgs, load_config};
use agentbench::error::Result as BenchResult;
use agentbench::process::ProcessExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use eyre::{Report, Result as EyreResult};
use mockable::DefaultEnv;
use tokio::runtime::{Handle, Runtime};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Everything a subcommand needs besides its own arguments.
struct Context<'a> {
    config: &'a AppConfig,
    cwd: &'a Utf8Path,
    executor: &'a ProcessExecutor,
    runtime_handle: &'a Handle,
    env: &'a DefaultEnv,
}

/// Application entry point.
///
/// Parses the CLI, installs logging, loads configuration with layered
/// precedence, then dispatches to the subcommand handler. The child process
/// exit code becomes the exit code of this process.
fn main() -> EyreResult<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    // Load configuration with layered precedence: defaults < file < env < CLI.
    let config = load_config(&cli).map_err(Report::from)?;

    let cwd = Utf8PathBuf::try_from(std::env::current_dir()?)?;
    let runtime = Runtime::new()?;
    let executor = ProcessExecutor::new();
    let env = DefaultEnv::new();
    let context = Context {
        config: &config,
        cwd: &cwd,
        executor: &executor,
        runtime_handle: runtime.handle(),
        env: &env,
    };

    let outcome = run(&cli, &context);

    // Container cleanups scheduled by a timeout run on this runtime, so they
    // must finish before it is dropped.
    let cleanup_bound = executor.timings().cleanup_wait.saturating_mul(2);
    runtime.block_on(executor.wait_for_cleanup(cleanup_bound));

    let code = outcome.map_err(Report::from)?;
    Ok(exit_code(code))
}

/// Install the tracing subscriber. `RUST_LOG` wins over `--log-level`.
///
/// Logs go to stderr so stdout carries only command output.
fn init_tracing(log_level: &str) -> EyreResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)?,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, context: &Context<'_>) -> BenchResult<i32> {
    match &cli.command {
        Commands::Run(args) => run_exercise(context, args),
        Commands::Version(args) => print_version(context, args),
        Commands::Exec(args) => exec_command(context, args),
    }
}

/// Run an agent against one exercise and echo its output.
fn run_exercise(context: &Context<'_>, args: &RunArgs) -> BenchResult<i32> {
    let instructions = match (&args.instructions, &args.instructions_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_instructions(path)?,
        (None, None) => String::new(),
    };
    let files = FileList {
        source_files: args.source_files.clone(),
        test_files: args.test_files.clone(),
    };

    let report = run_agent(RunParams {
        config: context.config,
        cwd: context.cwd,
        exercise: &args.exercise,
        instructions: &instructions,
        files: &files,
        executor: context.executor,
        runtime_handle: context.runtime_handle,
        env: context.env,
    })?;

    Ok(print_report(&report))
}

/// Print the detected agent version.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_version(context: &Context<'_>, args: &VersionArgs) -> BenchResult<i32> {
    let version = detect_version(VersionParams {
        config: context.config,
        agent: args.agent,
        executor: context.executor,
        runtime_handle: context.runtime_handle,
        env: context.env,
    })?;
    println!("{version}");
    Ok(0)
}

/// Run an arbitrary command and echo its output.
fn exec_command(context: &Context<'_>, args: &ExecArgs) -> BenchResult<i32> {
    let report = exec(ExecParams {
        config: context.config,
        command: args.command.clone(),
        working_dir: None,
        executor: context.executor,
        runtime_handle: context.runtime_handle,
    })?;
    Ok(print_report(&report))
}

/// Echo captured output and return the exit code to report.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
#[expect(clippy::print_stderr, reason = "CLI output is the intended behaviour")]
fn print_report(report: &RunReport) -> i32 {
    print!("{}", report.result.stdout());
    eprint!("{}", report.result.stderr());
    report.outcome.exit_code()
}

/// Map a child exit code onto the 0..=255 range a process can report.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code.rem_euclid(256)).unwrap_or(u8::MAX))
}
