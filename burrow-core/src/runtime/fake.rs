//! In-memory runtime double for tests.

use crate::error::{BurrowError, Result};
use crate::paths::TenantPaths;
use crate::runtime::ContainerRuntime;
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
struct FakeState {
    up_calls: usize,
    stop_calls: usize,
    start_calls: usize,
    down_calls: usize,
    inspect_calls: usize,
    down_removed_volumes: bool,
    /// (network, container) pairs currently attached.
    connections: BTreeSet<(String, String)>,
    /// Scripted inspect results, consumed front to back. When exhausted,
    /// `default_inspect` is returned.
    inspect_results: VecDeque<String>,
    default_inspect: String,
    fail_up: Option<String>,
    fail_stop: Option<String>,
    fail_start: Option<String>,
    fail_down: Option<String>,
    fail_connect: Option<String>,
    timeout_up: bool,
}

/// Scriptable `ContainerRuntime` that records calls and tracks network
/// attachments. Inspect results default to "running" unless scripted.
#[derive(Debug)]
pub struct FakeRuntime {
    inner: Mutex<FakeState>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FakeState {
                default_inspect: "running".to_string(),
                ..FakeState::default()
            }),
        }
    }

    /// Queue inspect results to be returned in order before the default.
    pub fn script_inspect<I, S>(&self, results: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.inner.lock().unwrap();
        state.inspect_results.extend(results.into_iter().map(Into::into));
    }

    /// Set the inspect result returned once scripted results run out.
    pub fn set_default_inspect(&self, status: &str) {
        self.inner.lock().unwrap().default_inspect = status.to_string();
    }

    pub fn fail_up(&self, stderr: &str) {
        self.inner.lock().unwrap().fail_up = Some(stderr.to_string());
    }

    pub fn fail_stop(&self, stderr: &str) {
        self.inner.lock().unwrap().fail_stop = Some(stderr.to_string());
    }

    pub fn fail_start(&self, stderr: &str) {
        self.inner.lock().unwrap().fail_start = Some(stderr.to_string());
    }

    pub fn fail_down(&self, stderr: &str) {
        self.inner.lock().unwrap().fail_down = Some(stderr.to_string());
    }

    pub fn fail_connect(&self, stderr: &str) {
        self.inner.lock().unwrap().fail_connect = Some(stderr.to_string());
    }

    /// Make `up` report a command timeout instead of succeeding.
    pub fn timeout_up(&self) {
        self.inner.lock().unwrap().timeout_up = true;
    }

    pub fn up_count(&self) -> usize {
        self.inner.lock().unwrap().up_calls
    }

    pub fn stop_count(&self) -> usize {
        self.inner.lock().unwrap().stop_calls
    }

    pub fn start_count(&self) -> usize {
        self.inner.lock().unwrap().start_calls
    }

    pub fn down_count(&self) -> usize {
        self.inner.lock().unwrap().down_calls
    }

    pub fn inspect_count(&self) -> usize {
        self.inner.lock().unwrap().inspect_calls
    }

    pub fn down_removed_volumes(&self) -> bool {
        self.inner.lock().unwrap().down_removed_volumes
    }

    pub fn connected(&self, network: &str, container: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .connections
            .contains(&(network.to_string(), container.to_string()))
    }

    pub fn connections(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().connections.iter().cloned().collect()
    }
}

fn command_failure(command: &str, stderr: &str) -> BurrowError {
    BurrowError::RuntimeCommand {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn up(&self, paths: &TenantPaths, timeout: Duration) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.up_calls += 1;
        if state.timeout_up {
            return Err(BurrowError::RuntimeTimeout {
                command: format!("docker compose -p {} up -d", paths.tenant_id()),
                timeout_secs: timeout.as_secs(),
            });
        }
        if let Some(stderr) = &state.fail_up {
            return Err(command_failure("docker compose up -d", stderr));
        }
        Ok(())
    }

    async fn stop(&self, _paths: &TenantPaths) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.stop_calls += 1;
        if let Some(stderr) = &state.fail_stop {
            return Err(command_failure("docker compose stop", stderr));
        }
        Ok(())
    }

    async fn start(&self, _paths: &TenantPaths) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.start_calls += 1;
        if let Some(stderr) = &state.fail_start {
            return Err(command_failure("docker compose start", stderr));
        }
        Ok(())
    }

    async fn down(&self, _paths: &TenantPaths, remove_volumes: bool) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.down_calls += 1;
        state.down_removed_volumes = remove_volumes;
        if let Some(stderr) = &state.fail_down {
            return Err(command_failure("docker compose down", stderr));
        }
        Ok(())
    }

    async fn inspect_status(&self, _container: &str) -> Result<String> {
        let mut state = self.inner.lock().unwrap();
        state.inspect_calls += 1;
        Ok(state
            .inspect_results
            .pop_front()
            .unwrap_or_else(|| state.default_inspect.clone()))
    }

    async fn connect_network(&self, network: &str, container: &str) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if let Some(stderr) = &state.fail_connect {
            return Err(command_failure("docker network connect", stderr));
        }
        let key = (network.to_string(), container.to_string());
        if !state.connections.insert(key) {
            return Err(command_failure(
                "docker network connect",
                &format!("endpoint with name {container} already exists in network {network}"),
            ));
        }
        Ok(())
    }

    async fn disconnect_network(&self, network: &str, container: &str) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        let key = (network.to_string(), container.to_string());
        if !state.connections.remove(&key) {
            return Err(command_failure(
                "docker network disconnect",
                &format!("container {container} is not connected to network {network}"),
            ));
        }
        Ok(())
    }
}
