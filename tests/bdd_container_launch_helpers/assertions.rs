//! Then-step assertions for container launch scenarios.

use agentbench::process::Command;
use rstest_bdd_macros::then;

use super::state::{ContainerLaunchState, LaunchOutcome};
use super::steps::StepResult;

fn prepared_command(state: &ContainerLaunchState) -> StepResult<Command> {
    match state.outcome.get() {
        Some(LaunchOutcome::Prepared(command)) => Ok(command),
        Some(LaunchOutcome::Failed { message }) => {
            Err(format!("expected a prepared launch, got failure: {message}"))
        }
        None => Err(String::from("launch outcome should be recorded")),
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

#[then("the launch starts with docker run --rm -i")]
fn launch_starts_with_docker_run(container_launch_state: &ContainerLaunchState) -> StepResult<()> {
    let command = prepared_command(container_launch_state)?;
    let prefix: Vec<&str> = command.args().iter().take(4).map(String::as_str).collect();
    if prefix == ["docker", "run", "--rm", "-i"] {
        Ok(())
    } else {
        Err(format!("unexpected launch prefix: {prefix:?}"))
    }
}

#[then("the container is named after {exercise}")]
fn container_is_named_after(
    container_launch_state: &ContainerLaunchState,
    exercise: String,
) -> StepResult<()> {
    let command = prepared_command(container_launch_state)?;
    let expected = format!("agentbench_{exercise}_");
    match value_after(command.args(), "--name") {
        Some(name) if name.starts_with(&expected) => Ok(()),
        other => Err(format!("expected a name starting {expected}, got {other:?}")),
    }
}

#[then("the agent command follows image {image}")]
fn agent_command_follows_image(
    container_launch_state: &ContainerLaunchState,
    image: String,
) -> StepResult<()> {
    let command = prepared_command(container_launch_state)?;
    match value_after(command.args(), &image) {
        Some("bash") => Ok(()),
        other => Err(format!("expected bash after {image}, got {other:?}")),
    }
}

#[then("the host command carries no environment overlay")]
fn host_command_has_no_overlay(container_launch_state: &ContainerLaunchState) -> StepResult<()> {
    let command = prepared_command(container_launch_state)?;
    if command.env().is_empty() {
        Ok(())
    } else {
        Err(format!("unexpected overlay: {:?}", command.env()))
    }
}

#[then("test file {file} is mounted read-only")]
fn test_file_is_mounted_read_only(
    container_launch_state: &ContainerLaunchState,
    file: String,
) -> StepResult<()> {
    let command = prepared_command(container_launch_state)?;
    let suffix = format!(":/workspace/{file}:ro");
    if command.args().iter().any(|arg| arg.ends_with(&suffix)) {
        Ok(())
    } else {
        Err(format!("no read-only mount for {file} in {:?}", command.args()))
    }
}

#[then("{key} is passed as an environment flag")]
fn key_is_passed_as_flag(
    container_launch_state: &ContainerLaunchState,
    key: String,
) -> StepResult<()> {
    let command = prepared_command(container_launch_state)?;
    let prefix = format!("{key}=");
    let flagged = command
        .args()
        .windows(2)
        .any(|pair| matches!(pair, [flag, value] if flag == "-e" && value.starts_with(&prefix)));
    if flagged {
        Ok(())
    } else {
        Err(format!("{key} not passed with -e in {:?}", command.args()))
    }
}

#[then("the launch fails with {message}")]
fn launch_fails_with(
    container_launch_state: &ContainerLaunchState,
    message: String,
) -> StepResult<()> {
    match container_launch_state.outcome.get() {
        Some(LaunchOutcome::Failed { message: actual }) if actual == message => Ok(()),
        Some(LaunchOutcome::Failed { message: actual }) => {
            Err(format!("expected failure '{message}', got '{actual}'"))
        }
        Some(LaunchOutcome::Prepared(_)) => Err(String::from("expected the launch to fail")),
        None => Err(String::from("launch outcome should be recorded")),
    }
}
