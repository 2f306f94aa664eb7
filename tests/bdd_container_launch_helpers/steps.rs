//! Given/When steps for container launch scenarios.

use std::sync::Arc;

use agentbench::agents::{AgentBuilder, AgentKind, AgentSettings, FileList, Provider};
use agentbench::config::AppConfig;
use agentbench::engine::{DockerExecutionStrategy, ExecutionStrategy, PrepareContext};
use agentbench::error::Result as BenchResult;
use agentbench::process::Command;
use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use mockable::MockEnv;
use rstest_bdd_macros::{given, when};
use tempfile::TempDir;

use super::state::{ContainerLaunchState, LaunchOutcome};

pub type StepResult<T> = Result<T, String>;

const EXERCISE: &str = "exercises/practice/two-fer";

fn update_config(
    state: &ContainerLaunchState,
    apply: impl FnOnce(&mut AppConfig),
) -> StepResult<()> {
    let mut config = state
        .config
        .get()
        .ok_or_else(|| String::from("config should be initialised"))?;
    apply(&mut config);
    state.config.set(config);
    Ok(())
}

fn mock_env(vars: Vec<(String, String)>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(move |key| {
        vars.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    });
    env
}

#[given("a benchmark workspace")]
fn a_benchmark_workspace(container_launch_state: &ContainerLaunchState) -> StepResult<()> {
    let dir = TempDir::new().map_err(|e| format!("temp dir should be created: {e}"))?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|path| format!("temp path is not UTF-8: {}", path.display()))?;
    let cache = root.join("cli-cache");
    update_config(container_launch_state, |config| {
        config.docker.cli_cache_dir = Some(cache);
    })?;
    container_launch_state.root.set(root);
    container_launch_state.sandbox.set(Arc::new(dir));
    Ok(())
}

#[given("agent {agent} with model {model} via {provider}")]
fn agent_with_model(
    container_launch_state: &ContainerLaunchState,
    agent: String,
    model: String,
    provider: String,
) -> StepResult<()> {
    let kind = AgentKind::from_str(&agent, true)?;
    let selected = Provider::from_str(&provider, true)?;
    update_config(container_launch_state, |config| {
        config.agent.kind = kind;
        config.agent.model = Some(model);
        config.agent.provider = Some(selected);
    })
}

#[given("the image is {image}")]
fn the_image_is(container_launch_state: &ContainerLaunchState, image: String) -> StepResult<()> {
    update_config(container_launch_state, |config| {
        config.image = Some(image);
    })
}

#[given("the environment provides {key}")]
fn the_environment_provides(container_launch_state: &ContainerLaunchState, key: String) {
    let mut vars = container_launch_state.env_vars.get().unwrap_or_default();
    let value = format!("{}-value", key.to_lowercase());
    vars.push((key, value));
    container_launch_state.env_vars.set(vars);
}

#[given("test file {file} is protected")]
fn test_file_is_protected(container_launch_state: &ContainerLaunchState, file: String) {
    let mut files = container_launch_state.test_files.get().unwrap_or_default();
    files.push(file);
    container_launch_state.test_files.set(files);
}

fn prepare_launch(
    root: &Utf8Path,
    config: &AppConfig,
    env: &MockEnv,
    test_files: Vec<String>,
) -> BenchResult<Command> {
    let settings = AgentSettings::from_config(config, root)?;
    let files = FileList {
        source_files: vec![String::from("two-fer.ts")],
        test_files: test_files.clone(),
    };
    let core = AgentBuilder::new(&settings, env)
        .build_command("Make the tests pass", &files)?
        .with_timeout(config.timeout());
    let context = PrepareContext {
        cwd: root.to_path_buf(),
        exercise_path: Utf8PathBuf::from(EXERCISE),
        test_files,
    };
    DockerExecutionStrategy::from_config(config, env)?.prepare(&core, &context)
}

#[when("the container launch is prepared")]
fn the_container_launch_is_prepared(
    container_launch_state: &ContainerLaunchState,
) -> StepResult<()> {
    let root = container_launch_state
        .root
        .get()
        .ok_or_else(|| String::from("workspace should be created"))?;
    let config = container_launch_state
        .config
        .get()
        .ok_or_else(|| String::from("config should be initialised"))?;
    let env = mock_env(container_launch_state.env_vars.get().unwrap_or_default());
    let test_files = container_launch_state.test_files.get().unwrap_or_default();

    let outcome = match prepare_launch(&root, &config, &env, test_files) {
        Ok(command) => LaunchOutcome::Prepared(command),
        Err(error) => LaunchOutcome::Failed {
            message: error.to_string(),
        },
    };
    container_launch_state.outcome.set(outcome);
    Ok(())
}
