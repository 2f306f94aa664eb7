//! Environment lookups over an injected snapshot.
//!
//! Builders and path resolvers never read the process environment directly.
//! They take a `mockable::Env` so tests can substitute a synthetic snapshot
//! instead of mutating global state.

use crate::error::AgentError;

/// Return the first key whose value is present and non-blank.
///
/// Values are trimmed before the blank check, but the returned value is the
/// raw value as stored in the environment.
///
/// # Example
///
/// ```ignore
/// use mockable::DefaultEnv;
/// use agentbench::env::first_present;
///
/// let env = DefaultEnv::new();
/// if let Some((key, _value)) = first_present(&env, &["GOOGLE_API_KEY", "GEMINI_API_KEY"]) {
///     println!("using {key}");
/// }
/// ```
#[must_use]
pub fn first_present<'k, E: mockable::Env>(
    env: &E,
    keys: &[&'k str],
) -> Option<(&'k str, String)> {
    keys.iter().find_map(|key| {
        env.string(key)
            .filter(|value| !value.trim().is_empty())
            .map(|value| (*key, value))
    })
}

/// Return the value of `key` if it is present and non-blank.
#[must_use]
pub fn non_blank<E: mockable::Env>(env: &E, key: &str) -> Option<String> {
    env.string(key).filter(|value| !value.trim().is_empty())
}

/// Require a single environment variable.
///
/// # Errors
///
/// Returns [`AgentError::MissingEnvironment`] carrying `message`, or a default
/// message naming `key`, when the variable is absent or blank.
pub fn require_env<E: mockable::Env>(
    env: &E,
    key: &str,
    message: Option<&str>,
) -> Result<String, AgentError> {
    non_blank(env, key).ok_or_else(|| AgentError::MissingEnvironment {
        message: message.map_or_else(
            || format!("Environment variable {key} is not set"),
            String::from,
        ),
    })
}

/// Require at least one of several environment variables.
///
/// # Errors
///
/// Returns [`AgentError::MissingEnvironment`] carrying `message`, or a default
/// message listing every key, when none of the variables is present.
pub fn require_any_env<'k, E: mockable::Env>(
    env: &E,
    keys: &[&'k str],
    message: Option<&str>,
) -> Result<(&'k str, String), AgentError> {
    first_present(env, keys).ok_or_else(|| AgentError::MissingEnvironment {
        message: message.map_or_else(
            || {
                format!(
                    "Please set at least one of the following environment variables: {}",
                    keys.join(", ")
                )
            },
            String::from,
        ),
    })
}
