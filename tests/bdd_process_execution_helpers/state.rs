//! Scenario state for process execution behavioural tests.

use std::collections::BTreeMap;

use agentbench::api::CommandOutcome;
use agentbench::process::CommandResult;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

#[derive(Default, ScenarioState)]
pub(crate) struct ProcessExecutionState {
    pub(crate) argv: Slot<Vec<String>>,
    pub(crate) env: Slot<BTreeMap<String, String>>,
    pub(crate) timeout_millis: Slot<u64>,
    pub(crate) result: Slot<CommandResult>,
    pub(crate) outcome: Slot<CommandOutcome>,
}

#[fixture]
pub(crate) fn process_execution_state() -> ProcessExecutionState {
    let state = ProcessExecutionState::default();
    state.env.set(BTreeMap::new());
    state
}
