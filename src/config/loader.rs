//! Configuration loading with layered precedence.
//!
//! This module loads configuration with the precedence order (lowest to
//! highest): application defaults, configuration file, environment variables,
//! command-line arguments.
//!
//! # Why manual layer composition?
//!
//! The `OrthoConfig` derive macro provides `load()`, but this loader drives a
//! `MergeComposer` directly because:
//!
//! 1. **Subcommand separation**: the `Cli` struct owns subcommand dispatch via
//!    clap, while `AppConfig` holds configuration values. Per-run flags such as
//!    `run --agent` still need to land in the CLI layer.
//!
//! 2. **Fail-fast environment parsing**: `OrthoConfig`'s environment layer
//!    silently ignores unparseable values. Typed `AGENTBENCH_*` variables with
//!    invalid values are rejected here with a clear error instead.
//!
//! 3. **Custom discovery integration**: `--config` must win over discovered
//!    files before falling back to XDG paths.
//!
//! # Environment variable handling
//!
//! Environment reads go through `mockable::Env`, so the environment layer can be
//! tested without mutating process state. String fields are always accepted.
//! Typed fields such as `AGENTBENCH_DOCKER_ENABLED` (bool) or
//! `AGENTBENCH_EXECUTION_TIMEOUT_SECS` (u64) fail loading when unparseable.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::DefaultEnv;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::{AppConfig, Cli, Commands};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    env_var: &'static str,
    path: &'static [&'static str],
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "AGENTBENCH_IMAGE",
        path: &["image"],
        var_type: EnvVarType::String,
    },
    // Agent fields
    EnvVarSpec {
        env_var: "AGENTBENCH_AGENT_KIND",
        path: &["agent", "kind"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_AGENT_MODEL",
        path: &["agent", "model"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_AGENT_PROVIDER",
        path: &["agent", "provider"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_AGENT_SCRIPT_PATH",
        path: &["agent", "script_path"],
        var_type: EnvVarType::String,
    },
    // Docker fields
    EnvVarSpec {
        env_var: "AGENTBENCH_DOCKER_ENABLED",
        path: &["docker", "enabled"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_DOCKER_WORKDIR",
        path: &["docker", "workdir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_DOCKER_LOG_MOUNT_TARGET",
        path: &["docker", "log_mount_target"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_DOCKER_CLI_CACHE_DIR",
        path: &["docker", "cli_cache_dir"],
        var_type: EnvVarType::String,
    },
    // Execution fields
    EnvVarSpec {
        env_var: "AGENTBENCH_EXECUTION_TIMEOUT_SECS",
        path: &["execution", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
    // Workspace fields
    EnvVarSpec {
        env_var: "AGENTBENCH_WORKSPACE_BENCHWORK_DIR",
        path: &["workspace", "benchwork_dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "AGENTBENCH_WORKSPACE_RUN_SUFFIX",
        path: &["workspace", "run_suffix"],
        var_type: EnvVarType::String,
    },
];

/// Returns the list of environment variable names recognised by the config loader.
///
/// Tests use this to clear every `AGENTBENCH_*` variable without keeping a
/// hand-written list in sync with the loader.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
///
/// Reads through `cap_std::fs_utf8`, opening the parent directory with ambient
/// authority and reading the file from there.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    debug!(%path, "loaded configuration file");
    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Load configuration with full layer precedence from the process environment.
///
/// # Errors
///
/// Returns the same errors as [`load_config_with_env`].
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &DefaultEnv::new())
}

/// Load configuration with full layer precedence.
///
/// Sources, later overriding earlier:
/// 1. Application defaults defined in the struct
/// 2. Configuration file (`--config`, or discovered via `AGENTBENCH_CONFIG_PATH`
///    and XDG paths)
/// 3. `AGENTBENCH_*` environment variables read from `env`
/// 4. Command-line arguments (from the provided `Cli`)
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - An explicit `--config` path that does not exist
/// - Malformed configuration files
/// - Invalid typed environment variable values (e.g., non-boolean for
///   `AGENTBENCH_DOCKER_ENABLED`)
/// - Values that do not deserialise after merging (e.g., an unknown agent kind)
pub fn load_config_with_env<E: mockable::Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(ref path) = resolve_config_path(cli)? {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let mut config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.normalize();

    Ok(config)
}

/// Pick the configuration file to load, if any.
///
/// An explicit `--config` path must exist. Otherwise the first existing
/// discovery candidate is used.
fn resolve_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(ref explicit) = cli.config {
        if !explicit.exists() {
            return Err(ConfigError::FileNotFound {
                path: explicit.clone().into_std_path_buf(),
            }
            .into());
        }
        return Ok(Some(explicit.clone()));
    }

    let discovery = ConfigDiscovery::builder("agentbench")
        .env_var("AGENTBENCH_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".agentbench.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Collect `AGENTBENCH_*` environment variables into a JSON value.
///
/// All mappings are defined in [`ENV_VAR_SPECS`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable (bool,
/// u64) has an unparseable value.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.trim().parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::U64 => match raw_value.trim().parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
///
/// Global flags apply to every subcommand. `run` and `version` flags that
/// mirror configuration fields override them for that invocation.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref image) = cli.image {
        overrides.insert("image".to_owned(), Value::String(image.clone()));
    }

    if cli.docker {
        insert_at_path(&mut overrides, &["docker", "enabled"], Value::Bool(true));
    }

    match &cli.command {
        Commands::Run(args) => {
            if let Some(kind) = args.agent {
                insert_at_path(
                    &mut overrides,
                    &["agent", "kind"],
                    Value::String(kind.as_str().to_owned()),
                );
            }
            if let Some(ref model) = args.model {
                insert_at_path(&mut overrides, &["agent", "model"], Value::String(model.clone()));
            }
            if let Some(provider) = args.provider {
                insert_at_path(
                    &mut overrides,
                    &["agent", "provider"],
                    Value::String(provider.as_str().to_owned()),
                );
            }
            if let Some(timeout) = args.timeout {
                insert_at_path(
                    &mut overrides,
                    &["execution", "timeout_secs"],
                    Value::Number(timeout.into()),
                );
            }
        }
        Commands::Version(args) => {
            if let Some(kind) = args.agent {
                insert_at_path(
                    &mut overrides,
                    &["agent", "kind"],
                    Value::String(kind.as_str().to_owned()),
                );
            }
        }
        Commands::Exec(args) => {
            if let Some(timeout) = args.timeout {
                insert_at_path(
                    &mut overrides,
                    &["execution", "timeout_secs"],
                    Value::Number(timeout.into()),
                );
            }
        }
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, Provider};
    use crate::config::{ExecArgs, RunArgs, VersionArgs};
    use crate::error::BenchError;
    use mockable::MockEnv;
    use rstest::{fixture, rstest};

    fn env_with_vars(mappings: Vec<(&'static str, &'static str)>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |key| {
            mappings
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| String::from(*value))
        });
        env
    }

    #[fixture]
    fn empty_env() -> MockEnv {
        env_with_vars(Vec::new())
    }

    fn cli_with(command: Commands) -> Cli {
        Cli {
            command,
            config: None,
            image: None,
            docker: false,
            log_level: String::from("info"),
        }
    }

    fn version_cli() -> Cli {
        cli_with(Commands::Version(VersionArgs { agent: None }))
    }

    #[rstest]
    fn env_var_names_cover_every_spec() {
        let names = env_var_names();
        assert_eq!(names.len(), ENV_VAR_SPECS.len());
        assert!(names.iter().all(|name| name.starts_with("AGENTBENCH_")));
    }

    #[rstest]
    fn empty_environment_produces_null_layer(empty_env: MockEnv) {
        let value = collect_env_vars(&empty_env).expect("collection should succeed");
        assert!(value.is_null());
    }

    #[rstest]
    fn typed_environment_values_are_parsed() {
        let env = env_with_vars(vec![
            ("AGENTBENCH_DOCKER_ENABLED", "true"),
            ("AGENTBENCH_EXECUTION_TIMEOUT_SECS", "90"),
            ("AGENTBENCH_AGENT_KIND", "aider"),
        ]);
        let value = collect_env_vars(&env).expect("collection should succeed");
        assert_eq!(
            value,
            serde_json::json!({
                "docker": { "enabled": true },
                "execution": { "timeout_secs": 90 },
                "agent": { "kind": "aider" }
            })
        );
    }

    #[rstest]
    #[case("AGENTBENCH_DOCKER_ENABLED", "maybe", "expected bool")]
    #[case("AGENTBENCH_EXECUTION_TIMEOUT_SECS", "-5", "expected unsigned integer")]
    #[case("AGENTBENCH_EXECUTION_TIMEOUT_SECS", "ten", "expected unsigned integer")]
    fn invalid_typed_values_fail_fast(
        #[case] key: &'static str,
        #[case] raw: &'static str,
        #[case] fragment: &str,
    ) {
        let env = env_with_vars(vec![(key, raw)]);
        let error = collect_env_vars(&env).expect_err("invalid value must fail");
        match error {
            BenchError::Config(ConfigError::InvalidValue { field, reason }) => {
                assert_eq!(field, key);
                assert!(reason.contains(fragment), "reason: {reason}");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[rstest]
    fn cli_overrides_are_null_without_flags() {
        assert!(build_cli_overrides(&version_cli()).is_null());
    }

    #[rstest]
    fn run_flags_become_cli_overrides() {
        let mut cli = cli_with(Commands::Run(RunArgs {
            exercise: Utf8PathBuf::from("exercises/two-fer"),
            instructions: Some(String::from("solve it")),
            instructions_file: None,
            agent: Some(AgentKind::OpenCode),
            model: Some(String::from("openai/gpt-4o")),
            provider: Some(Provider::OpenRouter),
            source_files: Vec::new(),
            test_files: Vec::new(),
            timeout: Some(0),
        }));
        cli.image = Some(String::from("bench:latest"));
        cli.docker = true;

        assert_eq!(
            build_cli_overrides(&cli),
            serde_json::json!({
                "image": "bench:latest",
                "docker": { "enabled": true },
                "agent": { "kind": "opencode", "model": "openai/gpt-4o", "provider": "openrouter" },
                "execution": { "timeout_secs": 0 }
            })
        );
    }

    #[rstest]
    fn exec_timeout_becomes_cli_override() {
        let cli = cli_with(Commands::Exec(ExecArgs {
            timeout: Some(5),
            command: vec![String::from("true")],
        }));
        assert_eq!(
            build_cli_overrides(&cli),
            serde_json::json!({ "execution": { "timeout_secs": 5 } })
        );
    }

    #[rstest]
    fn environment_overrides_defaults_and_cli_overrides_environment() {
        let env = env_with_vars(vec![
            ("AGENTBENCH_AGENT_KIND", "gemini"),
            ("AGENTBENCH_AGENT_MODEL", "gemini-2.5-pro"),
            ("AGENTBENCH_EXECUTION_TIMEOUT_SECS", "30"),
        ]);
        let cli = cli_with(Commands::Version(VersionArgs {
            agent: Some(AgentKind::Qwen),
        }));

        let config = load_config_with_env(&cli, &env).expect("config should load");
        assert_eq!(config.agent.kind, AgentKind::Qwen);
        assert_eq!(config.agent.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(config.execution.timeout_secs, 30);
    }

    #[rstest]
    fn unknown_agent_kind_fails_merge() {
        let env = env_with_vars(vec![("AGENTBENCH_AGENT_KIND", "clippy")]);
        let error = load_config_with_env(&version_cli(), &env).expect_err("unknown kind must fail");
        assert!(
            matches!(error, BenchError::Config(ConfigError::OrthoConfig(_))),
            "unexpected error: {error:?}"
        );
    }

    #[rstest]
    fn missing_explicit_config_file_is_reported(empty_env: MockEnv) {
        let mut cli = version_cli();
        cli.config = Some(Utf8PathBuf::from("/nonexistent/agentbench/config.toml"));
        let error = load_config_with_env(&cli, &empty_env).expect_err("missing file must fail");
        assert!(
            matches!(error, BenchError::Config(ConfigError::FileNotFound { .. })),
            "unexpected error: {error:?}"
        );
    }

    #[rstest]
    fn insert_at_path_creates_nested_objects() {
        let mut root = Map::new();
        insert_at_path(&mut root, &["a", "b", "c"], Value::Bool(true));
        assert_eq!(
            Value::Object(root),
            serde_json::json!({ "a": { "b": { "c": true } } })
        );
    }
}
