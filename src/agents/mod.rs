//! Agent selection and command building.
//!
//! Each supported coding-agent CLI is a variant of the closed [`AgentKind`]
//! enum. [`AgentBuilder`] turns an [`AgentSettings`] value and an environment
//! snapshot into a [`crate::process::Command`] that launches the agent through
//! the wrapper script.

mod builder;
mod environment;


use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{ConfigError, Result};

pub use builder::AgentBuilder;

/// Wrapper script location inside the benchmark container image.
pub const CONTAINER_SCRIPT_PATH: &str = "/app/scripts/run-agent.sh";

/// Supported coding-agent CLIs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum AgentKind {
    /// Anthropic's Claude Code CLI.
    #[default]
    Claude,
    /// The aider pair-programming CLI.
    Aider,
    /// Block's goose agent.
    Goose,
    /// OpenAI's Codex CLI.
    Codex,
    /// Google's Gemini CLI.
    Gemini,
    /// The Qwen Code CLI.
    Qwen,
    /// The opencode CLI.
    OpenCode,
    /// The Cursor agent CLI.
    Cursor,
}

impl AgentKind {
    /// Every agent kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Claude,
        Self::Aider,
        Self::Goose,
        Self::Codex,
        Self::Gemini,
        Self::Qwen,
        Self::OpenCode,
        Self::Cursor,
    ];

    /// Configuration name of the agent.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Aider => "aider",
            Self::Goose => "goose",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
            Self::Qwen => "qwen",
            Self::OpenCode => "opencode",
            Self::Cursor => "cursor",
        }
    }

    /// Executable name the wrapper script is asked to run.
    #[must_use]
    pub const fn cli_name(self) -> &'static str {
        match self {
            Self::Cursor => "cursor-agent",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model providers an agent can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum Provider {
    /// Anthropic.
    Anthropic,
    /// `OpenAI`.
    OpenAi,
    /// Google AI Studio.
    Google,
    /// `OpenRouter`.
    OpenRouter,
    /// Alibaba Cloud `DashScope`.
    DashScope,
    /// `DeepSeek`.
    DeepSeek,
    /// Moonshot AI.
    Moonshot,
    /// Z.ai.
    Zai,
    /// xAI.
    Xai,
    /// A local LM Studio server.
    LmStudio,
    /// A local Ollama server.
    Ollama,
    /// Codex OSS mode against a local endpoint.
    Local,
}

impl Provider {
    /// Configuration name of the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::OpenRouter => "openrouter",
            Self::DashScope => "dashscope",
            Self::DeepSeek => "deepseek",
            Self::Moonshot => "moonshot",
            Self::Zai => "zai",
            Self::Xai => "xai",
            Self::LmStudio => "lmstudio",
            Self::Ollama => "ollama",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved settings for one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// Agent CLI to launch.
    pub kind: AgentKind,
    /// Model identifier.
    pub model: String,
    /// Explicit provider, if any.
    pub provider: Option<Provider>,
    /// Wrapper script that installs and launches the CLI.
    pub script_path: Utf8PathBuf,
}

impl AgentSettings {
    /// Resolve agent settings from loaded configuration.
    ///
    /// The script path falls back to [`agent_script_path`] when the
    /// configuration does not override it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when no model is configured.
    pub fn from_config(config: &AppConfig, cwd: &Utf8Path) -> Result<Self> {
        let model = config
            .agent
            .model
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                field: String::from("agent.model"),
            })?;
        let script_path = config
            .agent
            .script_path
            .clone()
            .unwrap_or_else(|| agent_script_path(config.docker.enabled, cwd));

        Ok(Self {
            kind: config.agent.kind,
            model,
            provider: config.agent.provider,
            script_path,
        })
    }
}

/// Files the agent is told about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    /// Files the agent may edit.
    pub source_files: Vec<String>,
    /// Test files the agent may read but never modify.
    pub test_files: Vec<String>,
}

/// Location of the wrapper script that launches agent CLIs.
#[must_use]
pub fn agent_script_path(use_docker: bool, cwd: &Utf8Path) -> Utf8PathBuf {
    if use_docker {
        Utf8PathBuf::from(CONTAINER_SCRIPT_PATH)
    } else {
        cwd.join("scripts").join("run-agent.sh")
    }
}
