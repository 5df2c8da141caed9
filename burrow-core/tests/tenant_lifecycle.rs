//! End-to-end lifecycle journey through the public API.

use burrow_core::clock::ManualClock;
use burrow_core::orchestrator::CreateRequest;
use burrow_core::runtime::FakeRuntime;
use burrow_core::{
    ArtifactBuilder, NetworkAttacher, PortAllocator, Profile, ProfileConfig, Provisioner,
    StackController, StatusStore, TemplateStore, TenantStatus,
};
use std::sync::Arc;
use tempfile::TempDir;

fn config(base: &TempDir) -> Arc<ProfileConfig> {
    Arc::new(ProfileConfig {
        profile: Profile::Development,
        tenants_base_path: base.path().to_path_buf(),
        shared_api_containers: vec![
            "burrow-user-api-1".to_string(),
            "burrow-content-api-1".to_string(),
        ],
        shared_network_name: "burrow_burrow-net".to_string(),
        compose_filename: "docker-compose.tenant.yml".to_string(),
    })
}

#[tokio::test]
async fn test_full_tenant_journey() {
    let base = TempDir::new().unwrap();
    let config = config(&base);
    let store = Arc::new(StatusStore::new_in_memory().await.unwrap());
    let runtime = Arc::new(FakeRuntime::new());
    let clock = Arc::new(ManualClock::new());

    let provisioner = Provisioner::new(
        store.clone(),
        StackController::new(runtime.clone(), clock),
        NetworkAttacher::new(runtime.clone(), &config),
        ArtifactBuilder::new(TemplateStore::embedded(), &config),
        PortAllocator::new(store.clone()),
        config,
    );

    // Register
    let tenant = provisioner
        .create(CreateRequest {
            display_name: "Acme Corp".to_string(),
            owner_id: "owner-1".to_string(),
            admin_username: "acme-admin".to_string(),
            admin_password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(tenant.status, TenantStatus::Pending);

    // Provision
    let active = provisioner.provision(&tenant.id, "admin@acme.test").await.unwrap();
    assert_eq!(active.status, TenantStatus::Active);
    assert_eq!(active.datastore_host, Some(format!("{}-mysql", tenant.id)));
    let stack_dir = base.path().join(&tenant.id);
    assert!(stack_dir.join("docker-compose.tenant.yml").is_file());
    assert!(stack_dir.join(".tenant.json").is_file());
    assert!(runtime.connected(&format!("{}-net", tenant.id), "burrow-user-api-1"));

    // Stop: soft delete, everything survives
    let stopped = provisioner.stop(&tenant.id).await.unwrap();
    assert_eq!(stopped.status, TenantStatus::Deleted);
    assert_eq!(stopped.previous_status, Some(TenantStatus::Active));
    assert!(stack_dir.join(".env").is_file());

    // Restore: back to active with containers restarted
    let restored = provisioner.restore(&tenant.id).await.unwrap();
    assert_eq!(restored.status, TenantStatus::Active);
    assert!(restored.previous_status.is_none());
    assert_eq!(runtime.start_count(), 1);
    // Credentials survived the stop/restore cycle
    assert_eq!(restored.datastore_password, active.datastore_password);

    // Teardown requires a soft-deleted tenant first
    provisioner.stop(&tenant.id).await.unwrap();
    provisioner.teardown(&tenant.id).await.unwrap();

    assert!(runtime.down_removed_volumes());
    assert!(!stack_dir.exists());
    assert!(provisioner.get(&tenant.id).await.is_err());
    assert!(provisioner.list().await.unwrap().is_empty());
}
