//! Per-agent environment overlays.
//!
//! Keys count as present only when their value is non-blank. Optional keys
//! that are absent are left out of the overlay rather than set to an empty
//! string.

use std::collections::BTreeMap;

use crate::env::{non_blank, require_any_env, require_env};
use crate::error::AgentError;

use super::{AgentKind, AgentSettings, Provider};

type EnvMap = BTreeMap<String, String>;

const DASHSCOPE_ANTHROPIC_URL: &str =
    "https://dashscope-intl.aliyuncs.com/api/v2/apps/claude-code-proxy";
const DEEPSEEK_ANTHROPIC_URL: &str = "https://api.deepseek.com/anthropic";
const MOONSHOT_ANTHROPIC_URL: &str = "https://api.moonshot.ai/anthropic";
const ZAI_ANTHROPIC_URL: &str = "https://api.z.ai/api/anthropic";

const OPENAI_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";
const DASHSCOPE_COMPATIBLE_URL: &str = "https://dashscope-intl.aliyuncs.com/compatible-mode/v1";

const AIDER_SETTINGS: [(&str, &str); 6] = [
    ("AIDER_GIT", "false"),
    ("AIDER_AUTO_COMMITS", "false"),
    ("AIDER_SHOW_RELEASE_NOTES", "false"),
    ("AIDER_SKIP_SANITY_CHECK_REPO", "true"),
    ("AIDER_CHAT_HISTORY_FILE", "/dev/null"),
    ("AIDER_INPUT_HISTORY_FILE", "/dev/null"),
];

/// Compute the environment overlay for the configured agent.
pub(super) fn agent_environment<E: mockable::Env>(
    settings: &AgentSettings,
    env: &E,
) -> Result<EnvMap, AgentError> {
    match settings.kind {
        AgentKind::Claude => claude(settings.provider, env),
        AgentKind::Aider => aider(env),
        AgentKind::Goose => goose(settings, env),
        AgentKind::Codex => Ok(pass_through(env, &["OPENAI_API_KEY", "OPENROUTER_API_KEY"])),
        AgentKind::Gemini => gemini(env),
        AgentKind::Qwen => Ok(qwen(settings, env)),
        AgentKind::OpenCode => opencode(settings, env),
        AgentKind::Cursor => {
            let key = require_env(
                env,
                "CURSOR_API_KEY",
                Some("Missing CURSOR_API_KEY for Cursor Agent"),
            )?;
            Ok(map_of([("CURSOR_API_KEY", key)]))
        }
    }
}

fn claude<E: mockable::Env>(provider: Option<Provider>, env: &E) -> Result<EnvMap, AgentError> {
    let (key_var, label, base_url) = match provider {
        Some(Provider::DashScope) => (
            "DASHSCOPE_API_KEY",
            "DashScope",
            non_blank(env, "ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| String::from(DASHSCOPE_ANTHROPIC_URL)),
        ),
        Some(Provider::DeepSeek) => (
            "DEEPSEEK_API_KEY",
            "DeepSeek",
            String::from(DEEPSEEK_ANTHROPIC_URL),
        ),
        Some(Provider::Moonshot) => (
            "MOONSHOT_API_KEY",
            "Moonshot",
            String::from(MOONSHOT_ANTHROPIC_URL),
        ),
        Some(Provider::Zai) => ("ZAI_API_KEY", "ZAI", String::from(ZAI_ANTHROPIC_URL)),
        _ => {
            let (_, value) = require_any_env(
                env,
                &["ANTHROPIC_API_KEY", "DASHSCOPE_API_KEY"],
                Some("Missing ANTHROPIC_API_KEY or DASHSCOPE_API_KEY for Claude"),
            )?;
            return Ok(map_of([("ANTHROPIC_API_KEY", value)]));
        }
    };

    let message = format!("Missing {key_var} for Claude ({label}) provider");
    let value = require_env(env, key_var, Some(&message))?;
    Ok(map_of([
        ("ANTHROPIC_API_KEY", value.clone()),
        ("ANTHROPIC_AUTH_TOKEN", value),
        ("ANTHROPIC_BASE_URL", base_url),
    ]))
}

fn aider<E: mockable::Env>(env: &E) -> Result<EnvMap, AgentError> {
    let (key, value) = require_any_env(
        env,
        &[
            "OPENAI_API_KEY",
            "ANTHROPIC_API_KEY",
            "GOOGLE_API_KEY",
            "GEMINI_API_KEY",
        ],
        Some("Aider requires at least one major API key"),
    )?;

    let mut overlay: EnvMap = AIDER_SETTINGS
        .iter()
        .map(|(name, setting)| (String::from(*name), String::from(*setting)))
        .collect();
    match key {
        "GOOGLE_API_KEY" => {
            overlay.insert(String::from("GEMINI_API_KEY"), value.clone());
        }
        "GEMINI_API_KEY" => {
            overlay.insert(String::from("GOOGLE_API_KEY"), value.clone());
        }
        _ => {}
    }
    overlay.insert(String::from(key), value);
    Ok(overlay)
}

fn goose<E: mockable::Env>(settings: &AgentSettings, env: &E) -> Result<EnvMap, AgentError> {
    let provider = settings.provider.unwrap_or(Provider::Anthropic);
    let mut overlay = map_of([
        ("GOOSE_MODEL", settings.model.clone()),
        ("GOOSE_PROVIDER", String::from(provider.as_str())),
        ("GOOSE_DISABLE_KEYRING", String::from("1")),
    ]);

    let (key, value) = match provider {
        Provider::Anthropic => {
            let (_, value) = require_any_env(
                env,
                &["ANTHROPIC_API_KEY", "DASHSCOPE_API_KEY"],
                Some("Missing API key for Goose (Anthropic) provider"),
            )?;
            ("ANTHROPIC_API_KEY", value)
        }
        Provider::Google => require_any_env(
            env,
            &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Some("Missing API key for Goose (Google) provider"),
        )?,
        Provider::OpenAi => require_single(env, "OPENAI_API_KEY", "Goose (OpenAI)")?,
        Provider::DashScope => require_single(env, "DASHSCOPE_API_KEY", "Goose (DashScope)")?,
        Provider::DeepSeek => require_single(env, "DEEPSEEK_API_KEY", "Goose (DeepSeek)")?,
        Provider::Xai => require_single(env, "XAI_API_KEY", "Goose (xAI)")?,
        other => return Err(unsupported(AgentKind::Goose, other)),
    };
    overlay.insert(String::from(key), value);
    Ok(overlay)
}

fn gemini<E: mockable::Env>(env: &E) -> Result<EnvMap, AgentError> {
    let (key, value) = require_any_env(
        env,
        &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        Some("Missing API key for Gemini provider"),
    )?;
    let mut overlay = map_of([("GEMINI_API_KEY", value.clone())]);
    if key != "GEMINI_API_KEY" {
        overlay.insert(String::from(key), value);
    }
    Ok(overlay)
}

fn qwen<E: mockable::Env>(settings: &AgentSettings, env: &E) -> EnvMap {
    let model = settings.model.clone();
    let (base_url, api_key, openai_model) = match settings.provider {
        Some(Provider::OpenAi) => (
            Some(String::from(OPENAI_URL)),
            non_blank(env, "OPENAI_API_KEY"),
            model,
        ),
        Some(Provider::OpenRouter) => (
            Some(String::from(OPENROUTER_URL)),
            non_blank(env, "OPENROUTER_API_KEY"),
            model,
        ),
        Some(Provider::LmStudio) => (
            non_blank(env, "OPENAI_BASE_URL"),
            non_blank(env, "OPENAI_API_KEY"),
            non_blank(env, "OPENAI_MODEL").unwrap_or(model),
        ),
        _ => (
            Some(String::from(DASHSCOPE_COMPATIBLE_URL)),
            non_blank(env, "DASHSCOPE_API_KEY"),
            model,
        ),
    };

    let mut overlay = map_of([("OPENAI_MODEL", openai_model)]);
    insert_present(&mut overlay, "OPENAI_BASE_URL", base_url);
    insert_present(&mut overlay, "OPENAI_API_KEY", api_key);
    overlay
}

fn opencode<E: mockable::Env>(settings: &AgentSettings, env: &E) -> Result<EnvMap, AgentError> {
    let provider = settings.provider.unwrap_or(Provider::OpenAi);
    let key = match provider {
        Provider::OpenAi => "OPENAI_API_KEY",
        Provider::Anthropic => "ANTHROPIC_API_KEY",
        Provider::OpenRouter => "OPENROUTER_API_KEY",
        Provider::Xai => "XAI_API_KEY",
        Provider::DashScope => "DASHSCOPE_API_KEY",
        Provider::DeepSeek => "DEEPSEEK_API_KEY",
        Provider::Google => {
            let (source, value) = require_any_env(
                env,
                &["GOOGLE_GENERATIVE_AI_API_KEY", "GOOGLE_API_KEY"],
                Some("Missing GOOGLE_GENERATIVE_AI_API_KEY or GOOGLE_API_KEY for OpenCode"),
            )?;
            let mut overlay = map_of([("GOOGLE_GENERATIVE_AI_API_KEY", value.clone())]);
            if source == "GOOGLE_API_KEY" {
                overlay.insert(String::from(source), value);
            }
            return Ok(overlay);
        }
        Provider::LmStudio | Provider::Ollama => {
            let mut overlay = map_of([(
                "OPENAI_MODEL",
                non_blank(env, "OPENAI_MODEL").unwrap_or_else(|| settings.model.clone()),
            )]);
            insert_present(&mut overlay, "OPENAI_BASE_URL", non_blank(env, "OPENAI_BASE_URL"));
            insert_present(&mut overlay, "OPENAI_API_KEY", non_blank(env, "OPENAI_API_KEY"));
            return Ok(overlay);
        }
        other => return Err(unsupported(AgentKind::OpenCode, other)),
    };

    let message = format!("Missing {key} for OpenCode ({provider}) provider");
    let value = require_env(env, key, Some(&message))?;
    Ok(map_of([(key, value)]))
}

fn require_single<'k, E: mockable::Env>(
    env: &E,
    key: &'k str,
    label: &str,
) -> Result<(&'k str, String), AgentError> {
    let message = format!("Missing {key} for {label} provider");
    require_env(env, key, Some(&message)).map(|value| (key, value))
}

fn pass_through<E: mockable::Env>(env: &E, keys: &[&str]) -> EnvMap {
    keys.iter()
        .filter_map(|key| non_blank(env, key).map(|value| (String::from(*key), value)))
        .collect()
}

fn insert_present(overlay: &mut EnvMap, key: &str, value: Option<String>) {
    if let Some(present) = value {
        overlay.insert(String::from(key), present);
    }
}

fn unsupported(agent: AgentKind, provider: Provider) -> AgentError {
    AgentError::UnsupportedProvider {
        agent: String::from(agent.as_str()),
        provider: String::from(provider.as_str()),
    }
}

fn map_of<const N: usize>(entries: [(&str, String); N]) -> EnvMap {
    entries
        .into_iter()
        .map(|(key, value)| (String::from(key), value))
        .collect()
}
