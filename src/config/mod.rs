//! Configuration system for agentbench.
//!
//! This module provides the configuration structures and CLI definitions for
//! the agentbench application. Configuration loading and precedence merging is
//! handled by the `ortho_config` crate: CLI flags override environment
//! variables, which override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/agentbench/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! image = "agentbench-container"
//!
//! [agent]
//! kind = "claude"
//! model = "sonnet"
//! provider = "anthropic"
//!
//! [docker]
//! enabled = true
//! workdir = "/workspace"
//!
//! [execution]
//! timeout_secs = 600
//!
//! [workspace]
//! benchwork_dir = ".benchwork"
//! run_suffix = "-exercism-typescript"
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{Cli, Commands, ExecArgs, RunArgs, VersionArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{
    AgentConfig, AppConfig, DEFAULT_IMAGE, DEFAULT_TIMEOUT_SECS, DockerConfig, ExecutionConfig,
    WorkspaceConfig,
};
