//! Stack lifecycle controller.
//!
//! Drives a tenant stack through its container-level transitions: first
//! boot with readiness gating on the datastore, stop/start of existing
//! containers, and full teardown including volumes and on-disk artifacts.

use crate::clock::Clock;
use crate::error::{BurrowError, Result};
use crate::paths::TenantPaths;
use crate::runtime::ContainerRuntime;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Timeout for the initial `up` of a freshly rendered stack.
const UP_TIMEOUT: Duration = Duration::from_secs(120);

/// Delay between datastore readiness probes.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Probe attempts during first boot before giving up.
const START_POLL_ATTEMPTS: u32 = 30;

/// Probe attempts after restarting stopped containers. Best effort only.
const RESTART_POLL_ATTEMPTS: u32 = 15;

/// Settle delay after the datastore container reports running, giving the
/// server time to finish executing its init scripts.
const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Controls container-level transitions for tenant stacks.
pub struct StackController {
    runtime: Arc<dyn ContainerRuntime>,
    clock: Arc<dyn Clock>,
}

impl StackController {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, clock: Arc<dyn Clock>) -> Self {
        Self { runtime, clock }
    }

    fn datastore_container(paths: &TenantPaths) -> String {
        format!("{}-mysql", paths.tenant_id())
    }

    /// Poll the datastore container until it reports "running" or the
    /// attempt budget runs out. Inspect errors count as not ready; the
    /// container may not exist yet while the runtime is still creating it.
    async fn poll_datastore(&self, paths: &TenantPaths, attempts: u32) -> bool {
        let container = Self::datastore_container(paths);
        for attempt in 1..=attempts {
            match self.runtime.inspect_status(&container).await {
                Ok(status) if status == "running" => {
                    debug!(container = %container, attempt, "Datastore is running");
                    return true;
                }
                Ok(status) => {
                    debug!(container = %container, attempt, %status, "Datastore not ready");
                }
                Err(e) => {
                    debug!(container = %container, attempt, error = %e, "Datastore inspect failed");
                }
            }
            self.clock.sleep(POLL_INTERVAL).await;
        }
        false
    }

    /// Bring a freshly rendered stack up and wait for the datastore to be
    /// ready. The settle delay after readiness lets init scripts finish
    /// before callers hand out connection details.
    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    pub async fn start(&self, paths: &TenantPaths) -> Result<()> {
        self.runtime.up(paths, UP_TIMEOUT).await?;

        if !self.poll_datastore(paths, START_POLL_ATTEMPTS).await {
            return Err(BurrowError::DatastoreTimeout {
                tenant_id: paths.tenant_id().to_string(),
            });
        }

        self.clock.sleep(SETTLE_DELAY).await;
        info!("Tenant stack is up");
        Ok(())
    }

    /// Stop the stack's containers in place. Volumes and artifacts survive.
    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    pub async fn stop(&self, paths: &TenantPaths) -> Result<()> {
        self.runtime.stop(paths).await
    }

    /// Restart previously stopped containers. Readiness is probed with a
    /// shorter budget and is best effort: data volumes already exist, so a
    /// slow datastore comes up on its own.
    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    pub async fn restart(&self, paths: &TenantPaths) -> Result<()> {
        self.runtime.start(paths).await?;

        if !self.poll_datastore(paths, RESTART_POLL_ATTEMPTS).await {
            warn!("Datastore did not report running after restart, continuing");
        }
        Ok(())
    }

    /// Tear the stack down, removing containers, volumes, and the tenant's
    /// artifact directory. A `down` failure is logged and the artifact tree
    /// is removed regardless; a stack that was never started has nothing to
    /// bring down. Missing artifacts are not an error.
    #[instrument(skip(self, paths), fields(tenant_id = %paths.tenant_id()))]
    pub async fn teardown(&self, paths: &TenantPaths) -> Result<()> {
        if let Err(e) = self.runtime.down(paths, true).await {
            warn!(error = %e, "Failed to bring tenant stack down, removing artifacts anyway");
        }

        match tokio::fs::remove_dir_all(paths.dir()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BurrowError::IoError {
                    path: paths.dir().to_path_buf(),
                    source: e,
                });
            }
        }
        info!("Tenant stack removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::runtime::FakeRuntime;
    use tempfile::TempDir;

    fn controller_with(
        runtime: Arc<FakeRuntime>,
        clock: Arc<ManualClock>,
    ) -> StackController {
        StackController::new(runtime, clock)
    }

    fn paths(dir: &TempDir) -> TenantPaths {
        TenantPaths::new(dir.path(), "ten_abc12345", "docker-compose.tenant.yml")
    }

    #[tokio::test]
    async fn test_start_waits_for_datastore_then_settles() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.script_inspect(["created", "created", "running"]);
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());
        let dir = TempDir::new().unwrap();

        controller.start(&paths(&dir)).await.unwrap();

        assert_eq!(runtime.up_count(), 1);
        assert_eq!(runtime.inspect_count(), 3);
        // Two poll intervals before readiness, then the settle delay.
        assert_eq!(
            clock.slept(),
            vec![POLL_INTERVAL, POLL_INTERVAL, SETTLE_DELAY]
        );
    }

    #[tokio::test]
    async fn test_start_times_out_when_datastore_never_runs() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.set_default_inspect("created");
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());
        let dir = TempDir::new().unwrap();

        let err = controller.start(&paths(&dir)).await.unwrap_err();
        assert!(matches!(err, BurrowError::DatastoreTimeout { .. }));
        assert_eq!(runtime.inspect_count(), START_POLL_ATTEMPTS as usize);
        assert_eq!(clock.slept().len(), START_POLL_ATTEMPTS as usize);
        assert!(clock.slept().iter().all(|d| *d == POLL_INTERVAL));
    }

    #[tokio::test]
    async fn test_start_propagates_up_failure_without_polling() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.fail_up("port is already allocated");
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());
        let dir = TempDir::new().unwrap();

        let err = controller.start(&paths(&dir)).await.unwrap_err();
        assert!(matches!(err, BurrowError::RuntimeCommand { .. }));
        assert_eq!(runtime.inspect_count(), 0);
    }

    #[tokio::test]
    async fn test_start_surfaces_command_timeout() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.timeout_up();
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());
        let dir = TempDir::new().unwrap();

        let err = controller.start(&paths(&dir)).await.unwrap_err();
        assert!(matches!(err, BurrowError::RuntimeTimeout { .. }));
    }

    #[tokio::test]
    async fn test_restart_is_best_effort_about_readiness() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.set_default_inspect("restarting");
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());
        let dir = TempDir::new().unwrap();

        controller.restart(&paths(&dir)).await.unwrap();

        assert_eq!(runtime.start_count(), 1);
        assert_eq!(runtime.inspect_count(), RESTART_POLL_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn test_teardown_removes_volumes_and_artifacts() {
        let runtime = Arc::new(FakeRuntime::new());
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());

        let dir = TempDir::new().unwrap();
        let tenant_paths = paths(&dir);
        std::fs::create_dir_all(tenant_paths.dir()).unwrap();
        std::fs::write(tenant_paths.env_path(), "MYSQL_PORT=3310\n").unwrap();

        controller.teardown(&tenant_paths).await.unwrap();

        assert_eq!(runtime.down_count(), 1);
        assert!(runtime.down_removed_volumes());
        assert!(!tenant_paths.dir().exists());
    }

    #[tokio::test]
    async fn test_teardown_removes_artifacts_despite_down_failure() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.fail_down("daemon not responding");
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());

        let dir = TempDir::new().unwrap();
        let tenant_paths = paths(&dir);
        std::fs::create_dir_all(tenant_paths.dir()).unwrap();
        std::fs::write(tenant_paths.env_path(), "MYSQL_PORT=3310\n").unwrap();

        controller.teardown(&tenant_paths).await.unwrap();
        assert!(!tenant_paths.dir().exists());
    }

    #[tokio::test]
    async fn test_teardown_tolerates_missing_artifact_dir() {
        let runtime = Arc::new(FakeRuntime::new());
        let clock = Arc::new(ManualClock::new());
        let controller = controller_with(runtime.clone(), clock.clone());
        let dir = TempDir::new().unwrap();

        controller.teardown(&paths(&dir)).await.unwrap();
        assert_eq!(runtime.down_count(), 1);
    }
}
