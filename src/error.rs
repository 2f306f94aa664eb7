//! Semantic error types for the agentbench application.
//!
//! This module defines the error hierarchy for agentbench, following the
//! principle of using semantic error enums (via `thiserror`) for conditions the
//! caller might inspect or report, while reserving opaque errors
//! (`eyre::Report`) for the application boundary.
//!
//! Process failures (non-zero exits, timeouts, spawn failures) are not errors
//! at this level: they are folded into [`crate::process::CommandResult`] so a
//! benchmark run always yields a well-formed result.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    ///
    /// This wraps errors from the layered configuration system, including:
    /// - Configuration file parsing errors
    /// - Environment variable parsing errors
    /// - CLI argument parsing errors
    /// - Missing required fields after layer merging
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while assembling an agent command from provider settings.
#[derive(Debug, Error)]
pub enum AgentError {
    /// None of the environment variables the agent needs are set.
    #[error("{message}")]
    MissingEnvironment {
        /// Human-readable description naming the expected variables.
        message: String,
    },

    /// The agent does not support the configured provider.
    #[error("unsupported provider for {agent}: {provider}")]
    UnsupportedProvider {
        /// The agent CLI name.
        agent: String,
        /// The provider that was requested.
        provider: String,
    },
}

/// Errors from best-effort container cleanup.
///
/// These never escape the process executor; they are logged and discarded so
/// that cleanup cannot block or fail the timeout path.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The container engine CLI could not be run or reported a failure.
    #[error("failed to clean up container '{container_name}': {message}")]
    CleanupFailed {
        /// The name of the container being cleaned up.
        container_name: String,
        /// A description of the failure.
        message: String,
    },

    /// The container engine CLI did not answer within the bounded wait.
    #[error("cleanup of container '{container_name}' timed out after {millis} ms")]
    CleanupTimeout {
        /// The name of the container being cleaned up.
        container_name: String,
        /// The bounded wait in milliseconds.
        millis: u64,
    },
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// A file or directory was not found.
    #[error("path not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Top-level error type for the agentbench application.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the application. At the application boundary (main.rs),
/// these errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum BenchError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while building an agent command.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// An error occurred during container cleanup.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// A specialised `Result` type for agentbench operations.
pub type Result<T> = std::result::Result<T, BenchError>;
