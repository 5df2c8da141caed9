//! Tenant domain types.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Tenant lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Record exists but no infrastructure has been created yet
    Pending,

    /// Provisioning pipeline is running
    Provisioning,

    /// Stack is up, hosts and credentials are populated
    Active,

    /// Access administratively disabled (no lifecycle operation emits this yet)
    Suspended,

    /// Soft-deleted; containers stopped, artifacts preserved
    Deleted,
}

impl TenantStatus {
    /// String representation as persisted in the status store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Provisioning => "provisioning",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }

    /// Parse a status from its persisted representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "provisioning" => Some(Self::Provisioning),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin principal seeded into a tenant's application at bootstrap.
///
/// Set when the tenant record is created and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPrincipal {
    pub username: String,
    /// Bcrypt hash supplied by the caller. Never a plaintext password.
    pub password_hash: String,
}

/// A tenant record as persisted in the status store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Opaque tenant identifier (e.g. "ten_k3x9qw2p")
    pub id: String,

    /// Human-readable name
    pub display_name: String,

    /// Owner account identifier
    pub owner_id: String,

    /// Current lifecycle status
    pub status: TenantStatus,

    /// Status before soft delete. Non-null iff status is `deleted`.
    pub previous_status: Option<TenantStatus>,

    /// Datastore DNS name inside the container network, set on activation
    pub datastore_host: Option<String>,

    /// Cache DNS name inside the container network, set on activation
    pub cache_host: Option<String>,

    /// Datastore application user, set on activation
    pub datastore_user: Option<String>,

    /// Generated datastore password, set on activation
    pub datastore_password: Option<String>,

    /// Generated cache password, set on activation
    pub cache_password: Option<String>,

    /// Immutable admin principal
    pub admin: AdminPrincipal,

    /// Creation timestamp
    pub created_at: SystemTime,

    /// Last modification timestamp
    pub updated_at: SystemTime,
}

impl Tenant {
    /// Create a fresh tenant record in `pending` status with no infrastructure.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        owner_id: impl Into<String>,
        admin: AdminPrincipal,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            owner_id: owner_id.into(),
            status: TenantStatus::Pending,
            previous_status: None,
            datastore_host: None,
            cache_host: None,
            datastore_user: None,
            datastore_password: None,
            cache_password: None,
            admin,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Connection and credential fields persisted when a tenant becomes active.
#[derive(Debug, Clone)]
pub struct ActivationInfo {
    pub datastore_host: String,
    pub cache_host: String,
    pub datastore_user: String,
    pub datastore_password: String,
    pub cache_password: String,
}
