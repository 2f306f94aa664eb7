//! Container launch assembly.
//!
//! Agents run either directly on the host or inside a throwaway Docker
//! container. This module builds the `docker run` argument vector for the
//! latter: workspace and log bind mounts, read-only test-file mounts, explicit
//! environment flags and a container name unique per launch. The process
//! executor later reads that name back out of the arguments when it has to
//! clean up after a timeout.

mod args;
mod naming;
mod strategy;


pub use args::{
    CLI_CACHE_CONTAINER_PATH, CLI_CACHE_ENV, DOCKER_BASE_ARGS, cli_cache_args, environment_args,
    resolve_cli_cache_dir, workspace_args,
};
pub use naming::{CONTAINER_NAME_PREFIX, container_name};
pub use strategy::{
    DockerExecutionStrategy, ExecutionStrategy, LocalExecutionStrategy, PrepareContext,
};
