//! Then-step assertions for process execution scenarios.

use agentbench::api::CommandOutcome;
use agentbench::process::CommandResult;
use rstest_bdd_macros::then;

use super::state::ProcessExecutionState;
use super::steps::StepResult;

fn get_result(state: &ProcessExecutionState) -> StepResult<CommandResult> {
    state
        .result
        .get()
        .ok_or_else(|| String::from("command result should be recorded"))
}

fn get_outcome(state: &ProcessExecutionState) -> StepResult<CommandOutcome> {
    state
        .outcome
        .get()
        .ok_or_else(|| String::from("command outcome should be recorded"))
}

#[then("the exit code is {code}")]
fn the_exit_code_is(process_execution_state: &ProcessExecutionState, code: i32) -> StepResult<()> {
    let result = get_result(process_execution_state)?;
    if result.exit_code() == code {
        Ok(())
    } else {
        Err(format!(
            "expected exit code {code}, got {}",
            result.exit_code()
        ))
    }
}

#[then("stdout is {text}")]
fn stdout_is(process_execution_state: &ProcessExecutionState, text: String) -> StepResult<()> {
    let result = get_result(process_execution_state)?;
    if result.stdout().trim_end() == text {
        Ok(())
    } else {
        Err(format!("expected stdout '{text}', got '{}'", result.stdout()))
    }
}

#[then("stderr contains {text}")]
fn stderr_contains(process_execution_state: &ProcessExecutionState, text: String) -> StepResult<()> {
    let result = get_result(process_execution_state)?;
    if result.stderr().contains(&text) {
        Ok(())
    } else {
        Err(format!(
            "expected stderr to contain '{text}', got '{}'",
            result.stderr()
        ))
    }
}

#[then("the outcome is success")]
fn the_outcome_is_success(process_execution_state: &ProcessExecutionState) -> StepResult<()> {
    match get_outcome(process_execution_state)? {
        CommandOutcome::Success => Ok(()),
        other => Err(format!("expected success, got {other:?}")),
    }
}

#[then("the outcome is a command exit")]
fn the_outcome_is_command_exit(process_execution_state: &ProcessExecutionState) -> StepResult<()> {
    match get_outcome(process_execution_state)? {
        CommandOutcome::CommandExit { .. } => Ok(()),
        other => Err(format!("expected a command exit, got {other:?}")),
    }
}

#[then("the outcome is a timeout")]
fn the_outcome_is_timeout(process_execution_state: &ProcessExecutionState) -> StepResult<()> {
    let result = get_result(process_execution_state)?;
    match get_outcome(process_execution_state)? {
        CommandOutcome::TimedOut if result.timed_out() => Ok(()),
        other => Err(format!("expected a timeout, got {other:?}")),
    }
}
