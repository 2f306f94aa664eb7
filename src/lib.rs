//! Benchmark harness for AI coding-agent CLIs.
//!
//! `agentbench` runs third-party coding agents such as Claude Code, aider or
//! Codex against fixed exercises, on the host or inside a throwaway Docker
//! container, and reports how each run ended.
//!
//! # Architecture
//!
//! Most of the crate is declarative glue: agent builders map configuration to
//! an argument vector and an environment overlay, and the engine module wraps
//! that command in `docker run` flags. The one place with real concurrency is
//! [`process`]: it spawns the command, drains stdout and stderr concurrently,
//! enforces the timeout with escalating termination, and cleans up containers
//! that outlive a timed-out run.
//!
//! # Modules
//!
//! - [`agents`]: Agent and provider enums, command builders
//! - [`api`]: Orchestration entry points used by the CLI
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Docker argument assembly and execution strategies
//! - [`env`]: Environment snapshot helpers
//! - [`error`]: Semantic error types for the application
//! - [`process`]: Process execution and lifecycle
//! - [`sanitize`]: Path and timestamp sanitisers
//! - [`version`]: Agent CLI version detection

pub mod agents;
pub mod api;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod process;
pub mod sanitize;
pub mod version;
