//! Tenant artifact set rendering.
//!
//! Provisioning materializes one directory per tenant holding everything
//! the container runtime needs: the compose descriptor, the `.env` file
//! with generated secrets and assigned ports, tenant metadata, and the
//! datastore bootstrap scripts. The directory survives stop/restore and
//! is only removed at teardown.

use crate::error::{BurrowError, Result};
use crate::paths::TenantPaths;
use crate::ports::AllocatedPorts;
use crate::profile::ProfileConfig;
use crate::secret;
use crate::template::{
    render, TemplateStore, TokenMap, TEMPLATE_COMPOSE, TEMPLATE_ENV, TEMPLATE_METADATA,
    TEMPLATE_SQL_CONTENT, TEMPLATE_SQL_DATABASES, TEMPLATE_SQL_USERS,
};
use crate::types::Tenant;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, instrument};

/// Root credential length for the datastore.
const ROOT_PASSWORD_LEN: usize = 20;

/// Application credential length for datastore and cache.
const SERVICE_PASSWORD_LEN: usize = 16;

/// Datastore application user granted on the tenant's databases.
const DATASTORE_USER: &str = "admin";

/// Secrets generated while rendering an artifact set.
#[derive(Debug, Clone)]
pub struct StackSecrets {
    pub datastore_user: String,
    pub datastore_password: String,
    pub cache_password: String,
}

/// Renders and writes a tenant's artifact set.
pub struct ArtifactBuilder {
    templates: TemplateStore,
    shared_network: String,
}

impl ArtifactBuilder {
    pub fn new(templates: TemplateStore, config: &ProfileConfig) -> Self {
        Self { templates, shared_network: config.shared_network_name.clone() }
    }

    /// Generate fresh secrets and write the full artifact set for `tenant`.
    ///
    /// Every invocation generates new credentials; rendering is only done
    /// once per tenant, during provision.
    #[instrument(skip(self, tenant, owner_email, paths, ports), fields(tenant_id = %tenant.id))]
    pub async fn write(
        &self,
        tenant: &Tenant,
        owner_email: &str,
        paths: &TenantPaths,
        ports: &AllocatedPorts,
    ) -> Result<StackSecrets> {
        let secrets = StackSecrets {
            datastore_user: DATASTORE_USER.to_string(),
            datastore_password: secret::generate(SERVICE_PASSWORD_LEN),
            cache_password: secret::generate(SERVICE_PASSWORD_LEN),
        };
        let root_password = secret::generate(ROOT_PASSWORD_LEN);
        let created_at: DateTime<Utc> = tenant.created_at.into();

        let mut tokens = TokenMap::new();
        tokens.insert("TENANT_ID".to_string(), tenant.id.clone());
        tokens.insert("TENANT_NAME".to_string(), tenant.display_name.clone());
        tokens.insert("OWNER_ID".to_string(), tenant.owner_id.clone());
        tokens.insert("CREATED_AT".to_string(), created_at.to_rfc3339());
        tokens.insert("SHARED_NETWORK_NAME".to_string(), self.shared_network.clone());
        tokens.insert("MYSQL_ROOT_PASSWORD".to_string(), root_password);
        tokens.insert("MYSQL_USER".to_string(), secrets.datastore_user.clone());
        tokens.insert("MYSQL_PASSWORD".to_string(), secrets.datastore_password.clone());
        tokens.insert("MYSQL_PORT".to_string(), ports.datastore.to_string());
        tokens.insert("REDIS_PASSWORD".to_string(), secrets.cache_password.clone());
        tokens.insert("REDIS_PORT".to_string(), ports.cache.to_string());
        tokens.insert("PMA_PORT".to_string(), ports.db_admin.to_string());
        tokens.insert("REDISINSIGHT_PORT".to_string(), ports.cache_admin.to_string());
        tokens.insert("ADMIN_UUID".to_string(), uuid::Uuid::new_v4().to_string());
        tokens.insert("ADMIN_USERNAME".to_string(), tenant.admin.username.clone());
        tokens.insert("ADMIN_EMAIL".to_string(), owner_email.to_string());
        tokens.insert("ADMIN_PASSWORD_HASH".to_string(), tenant.admin.password_hash.clone());

        create_dir(paths.dir()).await?;
        create_dir(&paths.init_dir()).await?;

        self.render_to(TEMPLATE_COMPOSE, &tokens, &paths.compose_path()).await?;
        self.render_to(TEMPLATE_ENV, &tokens, &paths.env_path()).await?;
        self.render_to(TEMPLATE_METADATA, &tokens, &paths.metadata_path()).await?;
        self.render_to(
            TEMPLATE_SQL_DATABASES,
            &tokens,
            &paths.init_dir().join("01-create-databases.sql"),
        )
        .await?;
        self.render_to(
            TEMPLATE_SQL_USERS,
            &tokens,
            &paths.init_dir().join("02-init-users-db.sql"),
        )
        .await?;
        self.render_to(
            TEMPLATE_SQL_CONTENT,
            &tokens,
            &paths.init_dir().join("03-init-content-db.sql"),
        )
        .await?;

        debug!(dir = %paths.dir().display(), "Artifact set written");
        Ok(secrets)
    }

    async fn render_to(&self, template: &str, tokens: &TokenMap, target: &Path) -> Result<()> {
        let content = self.templates.read(template)?;
        let rendered = render(&content, tokens);
        tokio::fs::write(target, rendered).await.map_err(|e| BurrowError::IoError {
            path: target.to_path_buf(),
            source: e,
        })
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| BurrowError::IoError { path: path.to_path_buf(), source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Profile, ProfileConfig};
    use crate::types::AdminPrincipal;
    use tempfile::TempDir;

    fn config() -> ProfileConfig {
        ProfileConfig {
            profile: Profile::Development,
            tenants_base_path: "/tmp/tenants".into(),
            shared_api_containers: vec!["burrow-user-api-1".to_string()],
            shared_network_name: "burrow_burrow-net".to_string(),
            compose_filename: "docker-compose.tenant.yml".to_string(),
        }
    }

    fn tenant() -> Tenant {
        Tenant::new(
            "ten_abc12345",
            "Acme Corp",
            "owner-1",
            AdminPrincipal {
                username: "acme-admin".to_string(),
                password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            },
        )
    }

    fn ports() -> AllocatedPorts {
        AllocatedPorts { datastore: 3311, cache: 6381, db_admin: 8101, cache_admin: 5551 }
    }

    #[tokio::test]
    async fn test_write_produces_full_artifact_set() {
        let dir = TempDir::new().unwrap();
        let paths = TenantPaths::new(dir.path(), "ten_abc12345", "docker-compose.tenant.yml");
        let builder = ArtifactBuilder::new(TemplateStore::embedded(), &config());

        let secrets =
            builder.write(&tenant(), "admin@acme.test", &paths, &ports()).await.unwrap();

        assert!(paths.compose_path().is_file());
        assert!(paths.env_path().is_file());
        assert!(paths.metadata_path().is_file());
        assert!(paths.init_dir().join("01-create-databases.sql").is_file());
        assert!(paths.init_dir().join("02-init-users-db.sql").is_file());
        assert!(paths.init_dir().join("03-init-content-db.sql").is_file());

        assert_eq!(secrets.datastore_user, "admin");
        assert_eq!(secrets.datastore_password.len(), 16);
        assert_eq!(secrets.cache_password.len(), 16);
    }

    #[tokio::test]
    async fn test_written_artifacts_have_no_leftover_markers() {
        let dir = TempDir::new().unwrap();
        let paths = TenantPaths::new(dir.path(), "ten_abc12345", "docker-compose.tenant.yml");
        let builder = ArtifactBuilder::new(TemplateStore::embedded(), &config());

        builder.write(&tenant(), "admin@acme.test", &paths, &ports()).await.unwrap();

        for path in [
            paths.compose_path(),
            paths.env_path(),
            paths.metadata_path(),
            paths.init_dir().join("01-create-databases.sql"),
            paths.init_dir().join("02-init-users-db.sql"),
            paths.init_dir().join("03-init-content-db.sql"),
        ] {
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(!content.contains("{{"), "leftover marker in {:?}", path);
        }
    }

    #[tokio::test]
    async fn test_env_file_carries_ports_and_network() {
        let dir = TempDir::new().unwrap();
        let paths = TenantPaths::new(dir.path(), "ten_abc12345", "docker-compose.tenant.yml");
        let builder = ArtifactBuilder::new(TemplateStore::embedded(), &config());

        builder.write(&tenant(), "admin@acme.test", &paths, &ports()).await.unwrap();

        let env = std::fs::read_to_string(paths.env_path()).unwrap();
        assert!(env.contains("MYSQL_PORT=3311"));
        assert!(env.contains("REDIS_PORT=6381"));
        assert!(env.contains("PMA_PORT=8101"));
        assert!(env.contains("REDISINSIGHT_PORT=5551"));
        assert!(env.contains("SHARED_NETWORK_NAME=burrow_burrow-net"));
    }

    #[tokio::test]
    async fn test_metadata_is_valid_json() {
        let dir = TempDir::new().unwrap();
        let paths = TenantPaths::new(dir.path(), "ten_abc12345", "docker-compose.tenant.yml");
        let builder = ArtifactBuilder::new(TemplateStore::embedded(), &config());

        builder.write(&tenant(), "admin@acme.test", &paths, &ports()).await.unwrap();

        let metadata = std::fs::read_to_string(paths.metadata_path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&metadata).unwrap();
        assert_eq!(parsed["id"], "ten_abc12345");
        assert_eq!(parsed["name"], "Acme Corp");
        assert_eq!(parsed["services"]["mysql"]["port"], 3311);
    }

    #[tokio::test]
    async fn test_bootstrap_scripts_seed_admin_principal() {
        let dir = TempDir::new().unwrap();
        let paths = TenantPaths::new(dir.path(), "ten_abc12345", "docker-compose.tenant.yml");
        let builder = ArtifactBuilder::new(TemplateStore::embedded(), &config());

        builder.write(&tenant(), "admin@acme.test", &paths, &ports()).await.unwrap();

        let users_sql =
            std::fs::read_to_string(paths.init_dir().join("02-init-users-db.sql")).unwrap();
        assert!(users_sql.contains("'acme-admin'"));
        assert!(users_sql.contains("'admin@acme.test'"));
        assert!(users_sql.contains("$2b$12$abcdefghijklmnopqrstuv"));
        assert!(users_sql.contains("'admin'"));
    }

    #[tokio::test]
    async fn test_each_write_generates_fresh_secrets() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        let builder = ArtifactBuilder::new(TemplateStore::embedded(), &config());

        let paths_a = TenantPaths::new(dir_a.path(), "ten_abc12345", "stack.yml");
        let paths_b = TenantPaths::new(dir_b.path(), "ten_abc12345", "stack.yml");
        let a = builder.write(&tenant(), "a@acme.test", &paths_a, &ports()).await.unwrap();
        let b = builder.write(&tenant(), "b@acme.test", &paths_b, &ports()).await.unwrap();

        assert_ne!(a.datastore_password, b.datastore_password);
        assert_ne!(a.cache_password, b.cache_password);
    }
}
