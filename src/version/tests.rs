//! Unit tests for agent version detection.

use camino::Utf8PathBuf;
use mockall::mock;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use super::*;
use crate::process::{CommandResult, ExecuteFuture};

mock! {
    #[derive(Debug)]
    Executor {}

    impl CommandExecutor for Executor {
        fn execute(&self, command: &Command) -> ExecuteFuture<'_>;
    }
}

#[fixture]
fn runtime() -> Runtime {
    Runtime::new().expect("runtime should start")
}

fn executor_returning(exit_code: i32, stdout: &'static str, stderr: &'static str) -> MockExecutor {
    let mut executor = MockExecutor::new();
    executor.expect_execute().times(1).returning(move |_| {
        Box::pin(async move {
            CommandResult::new(exit_code, String::from(stdout), String::from(stderr))
        })
    });
    executor
}

#[rstest]
#[case(AgentKind::Claude, "1.0.98 (Claude Code)", "1.0.98")]
#[case(AgentKind::Claude, "node v20.11.1\nclaude-code 1.2.3", "1.2.3")]
#[case(AgentKind::Aider, "aider 0.45.1", "0.45.1")]
#[case(AgentKind::Goose, "Goose 1.2.0", "1.2.0")]
#[case(AgentKind::Codex, "codex-cli 0.20.0", "0.20.0")]
#[case(AgentKind::Cursor, "2025.08.25-896bbe1", "2025.08.25")]
#[case(AgentKind::Qwen, "version 2.1", "2.1.0")]
#[case(AgentKind::Gemini, "v7", "7.0.0")]
#[case(AgentKind::OpenCode, "no digits here", "unknown")]
fn parses_version_output(#[case] kind: AgentKind, #[case] output: &str, #[case] expected: &str) {
    assert_eq!(parse_version(kind, output), expected);
}

#[rstest]
fn plain_invocation_runs_cli_directly() {
    assert_eq!(
        version_args(AgentKind::Cursor, &VersionOptions::default()),
        ["cursor-agent", "--version"].map(String::from)
    );
}

#[rstest]
fn script_invocation_goes_through_wrapper() {
    let options = VersionOptions {
        script_path: Some(Utf8PathBuf::from("/app/scripts/run-agent.sh")),
        container: None,
    };
    assert_eq!(
        version_args(AgentKind::Gemini, &options),
        ["bash", "/app/scripts/run-agent.sh", "gemini", "--version"].map(String::from)
    );
}

#[rstest]
fn container_invocation_mounts_cli_cache() {
    let options = VersionOptions {
        script_path: Some(Utf8PathBuf::from("/app/scripts/run-agent.sh")),
        container: Some(ContainerTarget {
            image: String::from("agentbench-container"),
            cli_cache_dir: Utf8PathBuf::from("/cache"),
        }),
    };
    assert_eq!(
        version_args(AgentKind::Claude, &options),
        [
            "docker",
            "run",
            "--rm",
            "-i",
            "-v",
            "/cache:/root/.local",
            "agentbench-container",
            "bash",
            "/app/scripts/run-agent.sh",
            "claude",
            "--version"
        ]
        .map(String::from)
    );
}

#[rstest]
fn detect_parses_successful_output(runtime: Runtime) {
    let detector = VersionDetector::new(executor_returning(0, "aider 0.86.1\n", ""));
    let version = runtime.block_on(detector.detect(AgentKind::Aider, &VersionOptions::default()));
    assert_eq!(version, "0.86.1");
}

#[rstest]
fn detect_falls_back_on_failure(runtime: Runtime) {
    let detector = VersionDetector::new(executor_returning(127, "", "not found"));
    let version = runtime.block_on(detector.detect(AgentKind::Goose, &VersionOptions::default()));
    assert_eq!(version, FALLBACK_VERSION);
}

#[rstest]
fn detect_passes_built_command_to_executor(runtime: Runtime) {
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .withf(|command| command.args() == ["opencode", "--version"])
        .times(1)
        .returning(|_| Box::pin(async { CommandResult::new(0, String::from("0.5.1"), String::new()) }));

    let detector = VersionDetector::new(executor);
    let version =
        runtime.block_on(detector.detect(AgentKind::OpenCode, &VersionOptions::default()));

    assert_eq!(version, "0.5.1");
}
