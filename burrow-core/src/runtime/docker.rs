//! Docker CLI runtime client.
//!
//! Shells out to `docker compose` / `docker` with bounded timeouts. Command
//! failures surface stderr so callers can classify responses like
//! "already exists in network".

use crate::error::{BurrowError, Result};
use crate::paths::TenantPaths;
use crate::runtime::ContainerRuntime;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for `docker compose stop` and `down`.
const STOP_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for `docker compose start` on previously stopped containers.
const START_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for `docker inspect`.
const INSPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for network attach/detach.
const NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

/// Container runtime client backed by the `docker` binary.
#[derive(Debug, Default, Clone)]
pub struct DockerCli;

impl DockerCli {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, args: &[&str], cwd: Option<&Path>, timeout: Duration) -> Result<String> {
        let rendered = format!("docker {}", args.join(" "));
        debug!(command = %rendered, "Running runtime command");

        let mut cmd = tokio::process::Command::new("docker");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| BurrowError::RuntimeTimeout {
                command: rendered.clone(),
                timeout_secs: timeout.as_secs(),
            })?
            .map_err(|e| BurrowError::RuntimeCommand {
                command: rendered.clone(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BurrowError::RuntimeCommand {
                command: rendered,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn compose_args(&self, paths: &TenantPaths) -> Vec<String> {
        vec![
            "compose".to_string(),
            "-p".to_string(),
            paths.tenant_id().to_string(),
            "--env-file".to_string(),
            paths.env_path().to_string_lossy().to_string(),
            "-f".to_string(),
            paths.compose_path().to_string_lossy().to_string(),
        ]
    }

    async fn run_compose(
        &self,
        paths: &TenantPaths,
        tail: &[&str],
        timeout: Duration,
    ) -> Result<()> {
        let mut args = self.compose_args(paths);
        args.extend(tail.iter().map(|s| s.to_string()));
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs, Some(paths.dir()), timeout).await?;
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    async fn up(&self, paths: &TenantPaths, timeout: Duration) -> Result<()> {
        self.run_compose(paths, &["up", "-d"], timeout).await
    }

    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    async fn stop(&self, paths: &TenantPaths) -> Result<()> {
        self.run_compose(paths, &["stop"], STOP_TIMEOUT).await
    }

    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    async fn start(&self, paths: &TenantPaths) -> Result<()> {
        self.run_compose(paths, &["start"], START_TIMEOUT).await
    }

    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    async fn down(&self, paths: &TenantPaths, remove_volumes: bool) -> Result<()> {
        if remove_volumes {
            self.run_compose(paths, &["down", "-v"], STOP_TIMEOUT).await
        } else {
            self.run_compose(paths, &["down"], STOP_TIMEOUT).await
        }
    }

    async fn inspect_status(&self, container: &str) -> Result<String> {
        let stdout = self
            .run(
                &["inspect", "-f", "{{.State.Status}}", container],
                None,
                INSPECT_TIMEOUT,
            )
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn connect_network(&self, network: &str, container: &str) -> Result<()> {
        self.run(&["network", "connect", network, container], None, NETWORK_TIMEOUT).await?;
        Ok(())
    }

    async fn disconnect_network(&self, network: &str, container: &str) -> Result<()> {
        self.run(&["network", "disconnect", network, container], None, NETWORK_TIMEOUT).await?;
        Ok(())
    }
}
