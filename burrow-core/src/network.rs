//! Network topology manager.
//!
//! Each tenant stack runs on its own bridge network, created by the compose
//! descriptor as `{tenant_id}-net`. The shared API containers must be able
//! to reach every active tenant's datastore and cache, so this module
//! attaches them to the tenant network on provision/restore and detaches
//! them on stop/teardown. Attachment is idempotent and best effort: a
//! missing container or an existing endpoint never fails the operation.

use crate::profile::ProfileConfig;
use crate::runtime::ContainerRuntime;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Compose network name for a tenant stack.
pub fn tenant_network(tenant_id: &str) -> String {
    format!("{tenant_id}-net")
}

/// Attaches and detaches the shared API containers from tenant networks.
pub struct NetworkAttacher {
    runtime: Arc<dyn ContainerRuntime>,
    shared_containers: Vec<String>,
    shared_network: String,
}

impl NetworkAttacher {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: &ProfileConfig) -> Self {
        Self {
            runtime,
            shared_containers: config.shared_api_containers.clone(),
            shared_network: config.shared_network_name.clone(),
        }
    }

    /// Attach the shared API containers to the tenant's network, and make
    /// sure they sit on the shared core network as well. Tolerates
    /// containers that are already attached or not running.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn connect(&self, tenant_id: &str) {
        let network = tenant_network(tenant_id);
        for container in &self.shared_containers {
            self.attach(&network, container).await;
            self.attach(&self.shared_network, container).await;
        }
    }

    /// Detach the shared API containers from the tenant's network. The
    /// shared core network is left alone; other tenants still use it.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn disconnect(&self, tenant_id: &str) {
        let network = tenant_network(tenant_id);
        for container in &self.shared_containers {
            match self.runtime.disconnect_network(&network, container).await {
                Ok(()) => debug!(%network, %container, "Detached container"),
                Err(e) => {
                    debug!(%network, %container, error = %e, "Detach skipped");
                }
            }
        }
    }

    async fn attach(&self, network: &str, container: &str) {
        match self.runtime.connect_network(network, container).await {
            Ok(()) => debug!(%network, %container, "Attached container"),
            Err(e) => {
                let detail = e.to_string();
                if detail.contains("already exists") {
                    debug!(%network, %container, "Container already attached");
                } else {
                    warn!(%network, %container, error = %detail, "Attach failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::runtime::FakeRuntime;

    fn config() -> ProfileConfig {
        ProfileConfig {
            profile: Profile::Development,
            tenants_base_path: "/tmp/tenants".into(),
            shared_api_containers: vec![
                "burrow-user-api-1".to_string(),
                "burrow-content-api-1".to_string(),
            ],
            shared_network_name: "burrow_burrow-net".to_string(),
            compose_filename: "docker-compose.tenant.yml".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_attaches_shared_containers_to_both_networks() {
        let runtime = Arc::new(FakeRuntime::new());
        let attacher = NetworkAttacher::new(runtime.clone(), &config());

        attacher.connect("ten_abc12345").await;

        assert!(runtime.connected("ten_abc12345-net", "burrow-user-api-1"));
        assert!(runtime.connected("ten_abc12345-net", "burrow-content-api-1"));
        assert!(runtime.connected("burrow_burrow-net", "burrow-user-api-1"));
        assert!(runtime.connected("burrow_burrow-net", "burrow-content-api-1"));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let runtime = Arc::new(FakeRuntime::new());
        let attacher = NetworkAttacher::new(runtime.clone(), &config());

        attacher.connect("ten_abc12345").await;
        // Second connect hits "already exists" for every endpoint.
        attacher.connect("ten_abc12345").await;

        assert_eq!(runtime.connections().len(), 4);
    }

    #[tokio::test]
    async fn test_disconnect_detaches_tenant_network_only() {
        let runtime = Arc::new(FakeRuntime::new());
        let attacher = NetworkAttacher::new(runtime.clone(), &config());

        attacher.connect("ten_abc12345").await;
        attacher.disconnect("ten_abc12345").await;

        assert!(!runtime.connected("ten_abc12345-net", "burrow-user-api-1"));
        assert!(!runtime.connected("ten_abc12345-net", "burrow-content-api-1"));
        assert!(runtime.connected("burrow_burrow-net", "burrow-user-api-1"));
    }

    #[tokio::test]
    async fn test_connect_tolerates_runtime_failure() {
        let runtime = Arc::new(FakeRuntime::new());
        runtime.fail_connect("No such container: burrow-user-api-1");
        let attacher = NetworkAttacher::new(runtime.clone(), &config());

        // Logged as a warning, never an error.
        attacher.connect("ten_abc12345").await;
        assert!(runtime.connections().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_tolerates_absent_attachment() {
        let runtime = Arc::new(FakeRuntime::new());
        let attacher = NetworkAttacher::new(runtime.clone(), &config());

        // Nothing attached yet; must not panic or error.
        attacher.disconnect("ten_abc12345").await;
        assert!(runtime.connections().is_empty());
    }
}
