//! Scenario state for container launch behavioural tests.

use std::sync::Arc;

use agentbench::config::AppConfig;
use agentbench::process::Command;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub(crate) enum LaunchOutcome {
    Prepared(Command),
    Failed { message: String },
}

#[derive(Default, ScenarioState)]
pub(crate) struct ContainerLaunchState {
    pub(crate) sandbox: Slot<Arc<TempDir>>,
    pub(crate) root: Slot<Utf8PathBuf>,
    pub(crate) config: Slot<AppConfig>,
    pub(crate) env_vars: Slot<Vec<(String, String)>>,
    pub(crate) test_files: Slot<Vec<String>>,
    pub(crate) outcome: Slot<LaunchOutcome>,
}

#[fixture]
pub(crate) fn container_launch_state() -> ContainerLaunchState {
    let state = ContainerLaunchState::default();
    let mut config = AppConfig::default();
    config.docker.enabled = true;
    state.config.set(config);
    state.env_vars.set(Vec::new());
    state.test_files.set(Vec::new());
    state
}
