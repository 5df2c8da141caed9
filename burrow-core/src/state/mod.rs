//! Tenant status store with SQLite persistence.
//!
//! The StatusStore is the durable record of every tenant and its lifecycle
//! status. All status transitions go through here; the orchestrator reads
//! the stored status to gate operations and writes the outcome back.

use crate::error::{BurrowError, Result};
use crate::types::{ActivationInfo, Tenant, TenantStatus};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime};
use tracing::{info, instrument};

pub mod migrations;


/// Persistent store of tenant records and lifecycle statuses.
#[derive(Clone)]
pub struct StatusStore {
    pool: SqlitePool,
}

impl StatusStore {
    /// Create a store backed by an in-memory database (for tests).
    ///
    /// A single connection is required: every pooled connection to
    /// `:memory:` would otherwise get its own private database.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str(":memory:")
            .map_err(|e| BurrowError::DatabaseError(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| BurrowError::DatabaseError(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Get a reference to the underlying SQLite pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a store with a database at the specified path.
    #[instrument(skip(db_path))]
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        info!("Initializing status store at {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| BurrowError::InvalidConfig {
                reason: format!("Failed to create directory {}: {}", parent.display(), e),
            })?;
        }

        let options = SqliteConnectOptions::from_str(db_path.to_str().ok_or_else(|| {
            BurrowError::InvalidConfig { reason: "Invalid database path".to_string() }
        })?)
        .map_err(|e| BurrowError::DatabaseError(e.to_string()))?
        .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| BurrowError::DatabaseError(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!("Status store initialized successfully");
        Ok(store)
    }

    #[instrument(skip(self))]
    async fn run_migrations(&self) -> Result<()> {
        migrations::run(&self.pool).await
    }

    /// Insert a new tenant record.
    #[instrument(skip(self, tenant), fields(tenant_id = %tenant.id))]
    pub async fn insert_tenant(&self, tenant: &Tenant) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tenants (
                id, display_name, owner_id, status, previous_status,
                datastore_host, cache_host, datastore_user, datastore_password, cache_password,
                admin_username, admin_password_hash, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.display_name)
        .bind(&tenant.owner_id)
        .bind(tenant.status.as_str())
        .bind(tenant.previous_status.map(|s| s.as_str()))
        .bind(&tenant.datastore_host)
        .bind(&tenant.cache_host)
        .bind(&tenant.datastore_user)
        .bind(&tenant.datastore_password)
        .bind(&tenant.cache_password)
        .bind(&tenant.admin.username)
        .bind(&tenant.admin.password_hash)
        .bind(to_epoch_secs(tenant.created_at))
        .bind(to_epoch_secs(tenant.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return BurrowError::TenantAlreadyExists { tenant_id: tenant.id.clone() };
                }
            }
            metrics::counter!("burrow_db_errors_total", "operation" => "insert_tenant")
                .increment(1);
            BurrowError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    /// Get a tenant by ID.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn get_tenant(&self, id: &str) -> Result<Tenant> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                metrics::counter!("burrow_db_errors_total", "operation" => "get_tenant")
                    .increment(1);
                BurrowError::DatabaseError(e.to_string())
            })?;

        match row {
            Some(row) => row_to_tenant(row),
            None => Err(BurrowError::TenantNotFound { tenant_id: id.to_string() }),
        }
    }

    /// List all tenants, oldest first.
    #[instrument(skip(self))]
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BurrowError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(row_to_tenant).collect()
    }

    /// Count tenants whose status is anything other than `deleted`.
    ///
    /// Port assignment derives host ports from this count.
    #[instrument(skip(self))]
    pub async fn count_not_deleted(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tenants WHERE status != 'deleted'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BurrowError::DatabaseError(e.to_string()))
    }

    /// Update a tenant's status.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn update_status(&self, id: &str, status: TenantStatus) -> Result<()> {
        let result = sqlx::query("UPDATE tenants SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_epoch_secs())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                metrics::counter!("burrow_db_errors_total", "operation" => "update_status")
                    .increment(1);
                BurrowError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(BurrowError::TenantNotFound { tenant_id: id.to_string() });
        }
        Ok(())
    }

    /// Mark a tenant active and persist its connection details.
    #[instrument(skip(self, info), fields(tenant_id = %id))]
    pub async fn activate(&self, id: &str, info: &ActivationInfo) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET status = 'active',
                datastore_host = ?,
                cache_host = ?,
                datastore_user = ?,
                datastore_password = ?,
                cache_password = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&info.datastore_host)
        .bind(&info.cache_host)
        .bind(&info.datastore_user)
        .bind(&info.datastore_password)
        .bind(&info.cache_password)
        .bind(now_epoch_secs())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            metrics::counter!("burrow_db_errors_total", "operation" => "activate").increment(1);
            BurrowError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(BurrowError::TenantNotFound { tenant_id: id.to_string() });
        }
        Ok(())
    }

    /// Soft-delete a tenant: remember the current status and move to `deleted`.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tenants SET previous_status = status, status = 'deleted', updated_at = ? WHERE id = ?",
        )
        .bind(now_epoch_secs())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            metrics::counter!("burrow_db_errors_total", "operation" => "soft_delete").increment(1);
            BurrowError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(BurrowError::TenantNotFound { tenant_id: id.to_string() });
        }
        Ok(())
    }

    /// Restore a soft-deleted tenant to `target` and clear the remembered status.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn restore(&self, id: &str, target: TenantStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tenants SET status = ?, previous_status = NULL, updated_at = ? WHERE id = ?",
        )
        .bind(target.as_str())
        .bind(now_epoch_secs())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            metrics::counter!("burrow_db_errors_total", "operation" => "restore").increment(1);
            BurrowError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(BurrowError::TenantNotFound { tenant_id: id.to_string() });
        }
        Ok(())
    }

    /// Permanently delete a tenant record.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn delete_tenant(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                metrics::counter!("burrow_db_errors_total", "operation" => "delete_tenant")
                    .increment(1);
                BurrowError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}

fn to_epoch_secs(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

fn now_epoch_secs() -> i64 {
    to_epoch_secs(SystemTime::now())
}

fn from_epoch_secs(secs: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

fn parse_status(s: &str) -> Result<TenantStatus> {
    TenantStatus::parse(s)
        .ok_or_else(|| BurrowError::DatabaseError(format!("Unknown tenant status '{}'", s)))
}

fn row_to_tenant(row: sqlx::sqlite::SqliteRow) -> Result<Tenant> {
    let status: String = row.get("status");
    let previous_status: Option<String> = row.get("previous_status");

    Ok(Tenant {
        id: row.get("id"),
        display_name: row.get("display_name"),
        owner_id: row.get("owner_id"),
        status: parse_status(&status)?,
        previous_status: previous_status.as_deref().map(parse_status).transpose()?,
        datastore_host: row.get("datastore_host"),
        cache_host: row.get("cache_host"),
        datastore_user: row.get("datastore_user"),
        datastore_password: row.get("datastore_password"),
        cache_password: row.get("cache_password"),
        admin: crate::types::AdminPrincipal {
            username: row.get("admin_username"),
            password_hash: row.get("admin_password_hash"),
        },
        created_at: from_epoch_secs(row.get("created_at")),
        updated_at: from_epoch_secs(row.get("updated_at")),
    })
}
