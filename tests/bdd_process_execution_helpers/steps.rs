//! Given/When steps for process execution scenarios.

use std::time::Duration;

use agentbench::api::CommandOutcome;
use agentbench::process::{Command, ExecutorTimings, ProcessExecutor};
use rstest_bdd_macros::{given, when};
use tokio::runtime::Runtime;

use super::state::ProcessExecutionState;

pub type StepResult<T> = Result<T, String>;

#[given("a shell script {script}")]
fn a_shell_script(process_execution_state: &ProcessExecutionState, script: String) {
    process_execution_state.argv.set(vec![
        String::from("sh"),
        String::from("-c"),
        script,
    ]);
}

#[given("the program {program}")]
fn the_program(process_execution_state: &ProcessExecutionState, program: String) {
    process_execution_state.argv.set(vec![program]);
}

#[given("a timeout of {millis} ms")]
fn a_timeout_of(process_execution_state: &ProcessExecutionState, millis: u64) {
    process_execution_state.timeout_millis.set(millis);
}

#[given("the environment variable {key} is {value}")]
fn the_environment_variable(
    process_execution_state: &ProcessExecutionState,
    key: String,
    value: String,
) {
    let mut env = process_execution_state.env.get().unwrap_or_default();
    env.insert(key, value);
    process_execution_state.env.set(env);
}

#[when("the command is executed")]
fn the_command_is_executed(process_execution_state: &ProcessExecutionState) -> StepResult<()> {
    let argv = process_execution_state
        .argv
        .get()
        .ok_or_else(|| String::from("command should be configured"))?;
    let env = process_execution_state.env.get().unwrap_or_default();
    let timeout = process_execution_state
        .timeout_millis
        .get()
        .map(Duration::from_millis);

    let command = Command::new(argv)
        .map_err(|e| format!("command should be valid: {e}"))?
        .with_env(env)
        .with_timeout(timeout);

    let executor = ProcessExecutor::new().with_timings(ExecutorTimings {
        escalation_delay: Duration::from_millis(300),
        drain_grace: Duration::from_millis(300),
        ..ExecutorTimings::default()
    });
    let runtime = Runtime::new().map_err(|e| format!("runtime should start: {e}"))?;
    let result = executor.run_blocking(runtime.handle(), &command);

    process_execution_state
        .outcome
        .set(CommandOutcome::from_result(&result));
    process_execution_state.result.set(result);
    Ok(())
}
