//! Argument templates for each agent CLI.

use crate::error::Result;
use crate::process::Command;

use super::environment::agent_environment;
use super::{AgentKind, AgentSettings, FileList, Provider};

/// Aider edits these when no source files are listed.
const AIDER_DEFAULT_SOURCE_GLOB: &str = "*.ts";

/// Aider reads these when no test files are listed.
const AIDER_DEFAULT_TEST_GLOB: &str = "*.test.ts";

/// Builds the launch command for one agent invocation.
///
/// The builder reads the environment snapshot once per call and never
/// mutates it.
pub struct AgentBuilder<'a, E: mockable::Env> {
    settings: &'a AgentSettings,
    env: &'a E,
}

impl<'a, E: mockable::Env> AgentBuilder<'a, E> {
    /// Create a builder over `settings` and an environment snapshot.
    #[must_use]
    pub const fn new(settings: &'a AgentSettings, env: &'a E) -> Self {
        Self { settings, env }
    }

    /// Build the command that runs the agent with `instructions`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AgentError`] when a required API key is missing
    /// or the provider is not supported by the selected agent.
    pub fn build_command(&self, instructions: &str, files: &FileList) -> Result<Command> {
        let env = agent_environment(self.settings, self.env)?;
        let command = Command::new(self.core_args(instructions, files))?.with_env(env);
        Ok(command)
    }

    /// Argument vector for the agent, starting with the wrapper script.
    #[must_use]
    pub fn core_args(&self, instructions: &str, files: &FileList) -> Vec<String> {
        let settings = self.settings;
        let model = settings.model.as_str();
        let mut args = vec![
            String::from("bash"),
            settings.script_path.to_string(),
            String::from(settings.kind.cli_name()),
        ];

        match settings.kind {
            AgentKind::Claude => extend(
                &mut args,
                &[
                    "--debug",
                    "--verbose",
                    "--dangerously-skip-permissions",
                    "--model",
                    model,
                    "-p",
                    instructions,
                ],
            ),
            AgentKind::Aider => {
                extend(
                    &mut args,
                    &["--yes-always", "--no-auto-commits", "--model", model],
                );
                push_repeated(
                    &mut args,
                    "--file",
                    &files.source_files,
                    AIDER_DEFAULT_SOURCE_GLOB,
                );
                push_repeated(&mut args, "--read", &files.test_files, AIDER_DEFAULT_TEST_GLOB);
                extend(&mut args, &["--message", instructions]);
            }
            AgentKind::Goose => extend(
                &mut args,
                &["run", "--with-builtin", "developer", "--text", instructions],
            ),
            AgentKind::Codex => {
                extend(
                    &mut args,
                    &[
                        "exec",
                        "-c",
                        "model_reasoning_effort=high",
                        "--full-auto",
                        "--skip-git-repo-check",
                        "-m",
                        model,
                    ],
                );
                match settings.provider {
                    Some(Provider::Local) => extend(&mut args, &["--oss", instructions]),
                    provider => {
                        let name = provider.map_or("openai", Provider::as_str);
                        args.push(String::from("-c"));
                        args.push(format!("model_provider={name}"));
                        args.push(String::from(instructions));
                    }
                }
            }
            AgentKind::Gemini => extend(&mut args, &["--model", model, "-y", "-p", instructions]),
            AgentKind::Qwen => extend(&mut args, &["-y", "-m", model, "-p", instructions]),
            AgentKind::OpenCode => extend(&mut args, &["run", "-m", model, instructions]),
            AgentKind::Cursor => {
                extend(&mut args, &["--model", model, "-p", instructions]);
                args.extend(files.source_files.iter().cloned());
            }
        }

        args
    }
}

fn extend(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().copied().map(String::from));
}

/// Push `flag value` for each entry, or once with `fallback` when empty.
fn push_repeated(args: &mut Vec<String>, flag: &str, values: &[String], fallback: &str) {
    if values.is_empty() {
        extend(args, &[flag, fallback]);
        return;
    }
    for value in values {
        args.push(String::from(flag));
        args.push(value.clone());
    }
}
