//! Host port assignment for tenant stacks.
//!
//! Each service class has a dedicated base port; a tenant's host port is the
//! base plus the number of non-deleted tenants at provisioning time. The
//! result is monotonically non-decreasing in the tenant count and
//! deterministic for a fixed count.

use crate::error::{BurrowError, Result};
use crate::state::StatusStore;
use std::sync::Arc;

/// Base port for the MySQL datastore.
pub const BASE_PORT_DATASTORE: u16 = 3310;

/// Base port for the Redis cache.
pub const BASE_PORT_CACHE: u16 = 6380;

/// Base port for phpMyAdmin.
pub const BASE_PORT_DB_ADMIN: u16 = 8100;

/// Base port for RedisInsight.
pub const BASE_PORT_CACHE_ADMIN: u16 = 5550;

/// Host ports assigned to one tenant's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedPorts {
    pub datastore: u16,
    pub cache: u16,
    pub db_admin: u16,
    pub cache_admin: u16,
}

/// Computes the next free port per service class from the tenant count.
///
/// Not transactional: two provisions running concurrently for different
/// tenants can observe the same count and compute colliding ports. The
/// per-tenant lock in the orchestrator does not close this race.
pub struct PortAllocator {
    store: Arc<StatusStore>,
}

impl PortAllocator {
    pub fn new(store: Arc<StatusStore>) -> Self {
        Self { store }
    }

    /// Next free port for a service class: `base + count(status != deleted)`.
    pub async fn next_port(&self, base: u16) -> Result<u16> {
        let count = self.store.count_not_deleted().await?;
        let offset = u16::try_from(count).map_err(|_| {
            BurrowError::Internal(format!("tenant count {} exceeds the port range", count))
        })?;
        base.checked_add(offset).ok_or_else(|| {
            BurrowError::Internal(format!("port assignment overflows for base {}", base))
        })
    }

    /// Allocate one port per service class for a new stack.
    pub async fn allocate(&self) -> Result<AllocatedPorts> {
        Ok(AllocatedPorts {
            datastore: self.next_port(BASE_PORT_DATASTORE).await?,
            cache: self.next_port(BASE_PORT_CACHE).await?,
            db_admin: self.next_port(BASE_PORT_DB_ADMIN).await?,
            cache_admin: self.next_port(BASE_PORT_CACHE_ADMIN).await?,
        })
    }
}
