//! Error types for burrow.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use crate::types::TenantStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for burrow operations.
pub type Result<T> = std::result::Result<T, BurrowError>;

/// Main error type for burrow.
#[derive(Error, Debug)]
pub enum BurrowError {
    // Tenant lifecycle errors
    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound { tenant_id: String },

    #[error("Tenant already exists: {tenant_id}")]
    TenantAlreadyExists { tenant_id: String },

    #[error("Cannot {operation} tenant {tenant_id} while status is '{status}'")]
    InvalidStatus { tenant_id: String, operation: &'static str, status: TenantStatus },

    // Container runtime errors
    #[error("Runtime command failed: {command}: {stderr}")]
    RuntimeCommand { command: String, stderr: String },

    #[error("Runtime command timed out after {timeout_secs}s: {command}")]
    RuntimeTimeout { command: String, timeout_secs: u64 },

    #[error("Datastore container for tenant {tenant_id} did not become ready in time")]
    DatastoreTimeout { tenant_id: String },

    // Template errors
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Database migration failed: {reason}")]
    MigrationFailed { reason: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BurrowError {
    /// Create an Internal error from any error type.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(err.to_string())
    }
}
