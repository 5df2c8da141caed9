//! Database migrations.

use crate::error::{BurrowError, Result};
use sqlx::SqlitePool;
use tracing::{info, instrument};

const SCHEMA_VERSION: i64 = 1;

#[instrument(skip(pool))]
pub async fn run(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    let current_version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(pool)
            .await
            .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    let current_version = current_version.unwrap_or(0);

    if current_version >= SCHEMA_VERSION {
        info!("Database schema is up to date (version {})", current_version);
        return Ok(());
    }

    info!("Migrating database from version {} to {}", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        migrate_to_v1(pool).await?;
    }

    Ok(())
}

#[instrument(skip(pool))]
async fn migrate_to_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration to schema version 1");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenants (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            status TEXT NOT NULL,
            previous_status TEXT,
            datastore_host TEXT,
            cache_host TEXT,
            datastore_user TEXT,
            datastore_password TEXT,
            cache_password TEXT,
            admin_username TEXT NOT NULL,
            admin_password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    // Port assignment counts non-deleted tenants on every allocation
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tenants_status ON tenants(status)")
        .execute(pool)
        .await
        .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tenants_owner ON tenants(owner_id)")
        .execute(pool)
        .await
        .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    sqlx::query("DELETE FROM schema_version")
        .execute(pool)
        .await
        .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(1i64)
        .execute(pool)
        .await
        .map_err(|e| BurrowError::MigrationFailed { reason: e.to_string() })?;

    info!("Migration to schema version 1 complete");
    Ok(())
}
