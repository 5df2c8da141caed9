//! Burrow Core Library
//!
//! Provisioning core for isolated per-tenant container stacks: each tenant
//! gets its own datastore, cache, and admin tooling behind a private
//! network, driven through a four-operation lifecycle.

pub mod artifacts;
pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod orchestrator;
pub mod paths;
pub mod ports;
pub mod profile;
pub mod runtime;
pub mod secret;
pub mod state;
pub mod template;
pub mod types;

// Re-export commonly used items
pub use artifacts::ArtifactBuilder;
pub use clock::{Clock, TokioClock};
pub use error::{BurrowError, Result};
pub use lifecycle::StackController;
pub use network::NetworkAttacher;
pub use observability::init as init_observability;
pub use orchestrator::{CreateRequest, Provisioner};
pub use ports::{AllocatedPorts, PortAllocator};
pub use profile::{Profile, ProfileConfig};
pub use runtime::{ContainerRuntime, DockerCli};
pub use state::StatusStore;
pub use template::TemplateStore;
pub use types::{ActivationInfo, AdminPrincipal, Tenant, TenantStatus};
