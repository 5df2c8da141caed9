//! Centralized path configuration for burrow.
//!
//! All data paths should go through this module so the CLI and any embedding
//! service agree on where the status database and tenant artifacts live.

use std::path::{Path, PathBuf};

/// Get the burrow data directory.
///
/// Resolution order:
/// 1. `BURROW_DATA_DIR` environment variable
/// 2. `/var/lib/burrow` if it exists (system install)
/// 3. `~/.burrow` for user-only installs
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BURROW_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let system_dir = PathBuf::from("/var/lib/burrow");
    if system_dir.exists() {
        return system_dir;
    }

    dirs::home_dir().map(|h| h.join(".burrow")).unwrap_or(system_dir)
}

/// Get the status database path.
pub fn db_path() -> PathBuf {
    data_dir().join("burrow.db")
}

/// Get the default base directory for tenant artifact sets.
///
/// `BURROW_TENANTS_DIR` overrides the profile-resolved default.
pub fn tenants_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BURROW_TENANTS_DIR") {
        return PathBuf::from(dir);
    }
    data_dir().join("tenants")
}

/// Filesystem layout of one tenant's artifact set.
///
/// The directory is created during provision and deleted only at teardown;
/// it survives stop/restore cycles.
#[derive(Debug, Clone)]
pub struct TenantPaths {
    tenant_id: String,
    dir: PathBuf,
    compose_filename: String,
}

impl TenantPaths {
    pub fn new(base: &Path, tenant_id: &str, compose_filename: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            dir: base.join(tenant_id),
            compose_filename: compose_filename.to_string(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// The tenant-exclusive artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rendered compose descriptor.
    pub fn compose_path(&self) -> PathBuf {
        self.dir.join(&self.compose_filename)
    }

    /// Environment file holding generated secrets and ports.
    pub fn env_path(&self) -> PathBuf {
        self.dir.join(".env")
    }

    /// Tenant metadata file.
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(".tenant.json")
    }

    /// Directory of datastore bootstrap scripts.
    pub fn init_dir(&self) -> PathBuf {
        self.dir.join("mysql-init")
    }
}
