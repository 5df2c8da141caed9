//! Provisioning orchestrator.
//!
//! Sequences the full tenant lifecycle over the lower-level components:
//! status gating against the store, port assignment, artifact rendering,
//! container transitions, and network attachment. Operations on the same
//! tenant are serialized through a per-tenant lock; operations on
//! different tenants run concurrently.

use crate::artifacts::ArtifactBuilder;
use crate::error::{BurrowError, Result};
use crate::lifecycle::StackController;
use crate::network::NetworkAttacher;
use crate::paths::TenantPaths;
use crate::ports::PortAllocator;
use crate::profile::ProfileConfig;
use crate::secret;
use crate::state::StatusStore;
use crate::types::{ActivationInfo, AdminPrincipal, Tenant, TenantStatus};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Request to register a new tenant record.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub display_name: String,
    pub owner_id: String,
    pub admin_username: String,
    /// Bcrypt hash supplied by the caller. Plaintext never reaches the core.
    pub admin_password_hash: String,
}

/// Drives tenant stacks through their lifecycle.
pub struct Provisioner {
    store: Arc<StatusStore>,
    controller: StackController,
    attacher: NetworkAttacher,
    artifacts: ArtifactBuilder,
    allocator: PortAllocator,
    config: Arc<ProfileConfig>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Provisioner {
    pub fn new(
        store: Arc<StatusStore>,
        controller: StackController,
        attacher: NetworkAttacher,
        artifacts: ArtifactBuilder,
        allocator: PortAllocator,
        config: Arc<ProfileConfig>,
    ) -> Self {
        Self { store, controller, attacher, artifacts, allocator, config, locks: DashMap::new() }
    }

    fn lock_for(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(tenant_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    fn tenant_paths(&self, tenant_id: &str) -> TenantPaths {
        TenantPaths::new(&self.config.tenants_base_path, tenant_id, &self.config.compose_filename)
    }

    /// Register a new tenant record in `pending` status.
    ///
    /// No infrastructure is touched; `provision` does that later.
    #[instrument(skip(self, request), fields(display_name = %request.display_name))]
    pub async fn create(&self, request: CreateRequest) -> Result<Tenant> {
        let tenant = Tenant::new(
            secret::tenant_id(),
            request.display_name,
            request.owner_id,
            AdminPrincipal {
                username: request.admin_username,
                password_hash: request.admin_password_hash,
            },
        );
        self.store.insert_tenant(&tenant).await?;
        info!(tenant_id = %tenant.id, "Tenant record created");
        Ok(tenant)
    }

    /// List all tenant records.
    pub async fn list(&self) -> Result<Vec<Tenant>> {
        self.store.list_tenants().await
    }

    /// Get one tenant record.
    pub async fn get(&self, tenant_id: &str) -> Result<Tenant> {
        self.store.get_tenant(tenant_id).await
    }

    /// Provision a pending tenant's stack and activate the record.
    ///
    /// On any pipeline failure the status is reverted to `pending` so the
    /// operation can be retried; artifacts already written are left in
    /// place and overwritten by the retry.
    #[instrument(skip(self, owner_email), fields(tenant_id = %tenant_id))]
    pub async fn provision(&self, tenant_id: &str, owner_email: &str) -> Result<Tenant> {
        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let tenant = self.store.get_tenant(tenant_id).await?;
        if tenant.status != TenantStatus::Pending {
            return Err(BurrowError::InvalidStatus {
                tenant_id: tenant_id.to_string(),
                operation: "provision",
                status: tenant.status,
            });
        }

        self.store.update_status(tenant_id, TenantStatus::Provisioning).await?;

        if let Err(e) = self.run_provision_pipeline(&tenant, owner_email).await {
            // Revert so the operation can be retried from scratch.
            if let Err(revert) = self.store.update_status(tenant_id, TenantStatus::Pending).await {
                warn!(error = %revert, "Failed to revert tenant to pending");
            }
            return Err(e);
        }

        info!("Tenant provisioned");
        self.store.get_tenant(tenant_id).await
    }

    /// The failure of any step here, including persisting the activation,
    /// reverts the tenant to `pending`.
    async fn run_provision_pipeline(&self, tenant: &Tenant, owner_email: &str) -> Result<()> {
        let paths = self.tenant_paths(&tenant.id);
        let ports = self.allocator.allocate().await?;
        let secrets = self.artifacts.write(tenant, owner_email, &paths, &ports).await?;

        self.controller.start(&paths).await?;
        self.attacher.connect(&tenant.id).await;

        self.store
            .activate(
                &tenant.id,
                &ActivationInfo {
                    datastore_host: format!("{}-mysql", tenant.id),
                    cache_host: format!("{}-redis", tenant.id),
                    datastore_user: secrets.datastore_user,
                    datastore_password: secrets.datastore_password,
                    cache_password: secrets.cache_password,
                },
            )
            .await
    }

    /// Stop a tenant's stack and soft-delete the record.
    ///
    /// Containers, volumes, and artifacts all survive; `restore` undoes
    /// this. Container and network failures are tolerated so a half-dead
    /// stack can still be put into `deleted`.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn stop(&self, tenant_id: &str) -> Result<Tenant> {
        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let tenant = self.store.get_tenant(tenant_id).await?;
        if !matches!(tenant.status, TenantStatus::Active | TenantStatus::Provisioning) {
            return Err(BurrowError::InvalidStatus {
                tenant_id: tenant_id.to_string(),
                operation: "stop",
                status: tenant.status,
            });
        }

        let paths = self.tenant_paths(tenant_id);
        if let Err(e) = self.controller.stop(&paths).await {
            warn!(error = %e, "Failed to stop tenant containers, continuing");
        }
        self.attacher.disconnect(tenant_id).await;

        self.store.soft_delete(tenant_id).await?;
        info!("Tenant stopped");
        self.store.get_tenant(tenant_id).await
    }

    /// Restore a soft-deleted tenant to the status it held before `stop`.
    ///
    /// A tenant that was active gets its containers restarted and the
    /// shared API containers reattached; both are best effort, and the
    /// status restore is persisted regardless. A tenant deleted before it
    /// ever became active just returns to `pending`.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn restore(&self, tenant_id: &str) -> Result<Tenant> {
        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let tenant = self.store.get_tenant(tenant_id).await?;
        if tenant.status != TenantStatus::Deleted {
            return Err(BurrowError::InvalidStatus {
                tenant_id: tenant_id.to_string(),
                operation: "restore",
                status: tenant.status,
            });
        }

        let target = tenant.previous_status.unwrap_or(TenantStatus::Pending);
        if target == TenantStatus::Active {
            let paths = self.tenant_paths(tenant_id);
            if let Err(e) = self.controller.restart(&paths).await {
                warn!(error = %e, "Failed to restart tenant containers, continuing");
            }
            self.attacher.connect(tenant_id).await;
        }

        self.store.restore(tenant_id, target).await?;
        info!(target = %target, "Tenant restored");
        self.store.get_tenant(tenant_id).await
    }

    /// Permanently remove a soft-deleted tenant: containers, volumes,
    /// artifacts, and finally the record itself.
    ///
    /// Infrastructure cleanup failures are logged and do not block record
    /// removal; a stack that was never started has nothing to tear down.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn teardown(&self, tenant_id: &str) -> Result<()> {
        let lock = self.lock_for(tenant_id);
        let _guard = lock.lock().await;

        let tenant = self.store.get_tenant(tenant_id).await?;
        if tenant.status != TenantStatus::Deleted {
            return Err(BurrowError::InvalidStatus {
                tenant_id: tenant_id.to_string(),
                operation: "teardown",
                status: tenant.status,
            });
        }

        self.attacher.disconnect(tenant_id).await;

        let paths = self.tenant_paths(tenant_id);
        if let Err(e) = self.controller.teardown(&paths).await {
            warn!(error = %e, "Failed to tear down tenant stack, removing record anyway");
        }

        self.store.delete_tenant(tenant_id).await?;
        self.locks.remove(tenant_id);
        info!("Tenant removed");
        Ok(())
    }
}
