//! Container runtime client abstraction.
//!
//! The provisioning core never shells out directly; every interaction with
//! the container runtime goes through the `ContainerRuntime` trait. The real
//! implementation (`DockerCli`) wraps the `docker` binary; `FakeRuntime` is
//! an in-memory double for deterministic tests of the lifecycle controller
//! and orchestrator without a live runtime.

mod docker;
mod fake;

pub use docker::DockerCli;
pub use fake::FakeRuntime;

use crate::error::Result;
use crate::paths::TenantPaths;
use async_trait::async_trait;
use std::time::Duration;

/// Client for the container runtime hosting tenant stacks.
///
/// Stack-level operations are keyed by a tenant's artifact paths: the stack
/// id is the tenant id, and the descriptor/env files live in the tenant's
/// artifact directory.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Bring the stack up detached, reading variables from the env file.
    /// Fatal if the command exceeds `timeout`.
    async fn up(&self, paths: &TenantPaths, timeout: Duration) -> Result<()>;

    /// Stop the stack's containers without removing volumes.
    async fn stop(&self, paths: &TenantPaths) -> Result<()>;

    /// Start previously stopped containers.
    async fn start(&self, paths: &TenantPaths) -> Result<()>;

    /// Bring the stack down, optionally removing its volumes.
    async fn down(&self, paths: &TenantPaths, remove_volumes: bool) -> Result<()>;

    /// Inspect a container's running state (e.g. "running", "created", "exited").
    async fn inspect_status(&self, container: &str) -> Result<String>;

    /// Attach a container to a network.
    async fn connect_network(&self, network: &str, container: &str) -> Result<()>;

    /// Detach a container from a network.
    async fn disconnect_network(&self, network: &str, container: &str) -> Result<()>;
}
