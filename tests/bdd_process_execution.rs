//! Behavioural tests for host process execution.

mod bdd_process_execution_helpers;

use bdd_process_execution_helpers::{ProcessExecutionState, process_execution_state};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/process_execution.feature",
    name = "Successful command output is captured"
)]
fn successful_command_output_is_captured(process_execution_state: ProcessExecutionState) {
    let _ = process_execution_state;
}

#[scenario(
    path = "tests/features/process_execution.feature",
    name = "Non-zero exit codes are reported with both streams"
)]
fn non_zero_exit_codes_are_reported(process_execution_state: ProcessExecutionState) {
    let _ = process_execution_state;
}

#[scenario(
    path = "tests/features/process_execution.feature",
    name = "Slow commands are killed at the timeout"
)]
fn slow_commands_are_killed(process_execution_state: ProcessExecutionState) {
    let _ = process_execution_state;
}

#[scenario(
    path = "tests/features/process_execution.feature",
    name = "Commands exiting with 124 are not timeouts"
)]
fn commands_exiting_with_124_are_not_timeouts(process_execution_state: ProcessExecutionState) {
    let _ = process_execution_state;
}

#[scenario(
    path = "tests/features/process_execution.feature",
    name = "Missing executables are reported as results"
)]
fn missing_executables_are_reported(process_execution_state: ProcessExecutionState) {
    let _ = process_execution_state;
}

#[scenario(
    path = "tests/features/process_execution.feature",
    name = "Environment overlay reaches the child"
)]
fn environment_overlay_reaches_the_child(process_execution_state: ProcessExecutionState) {
    let _ = process_execution_state;
}
