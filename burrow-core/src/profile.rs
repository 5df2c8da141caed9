//! Deployment profile resolution.
//!
//! A profile maps the deployment environment (development, staging,
//! production) to the immutable bundle of settings the provisioning core
//! needs: where tenant artifact sets live, which shared API containers get
//! attached to tenant networks, and the name of the platform-shared network.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Environment variable holding the profile name.
pub const PROFILE_ENV_VAR: &str = "BURROW_ENV";

/// Deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Staging,
    Production,
}

impl Profile {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Parse a profile name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "development" => Some(Self::Development),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    /// Resolve the profile from the environment, read once at process start.
    ///
    /// An unrecognized value falls back to `Development`. The fallback is
    /// logged at WARN so a typo in deployment configuration stays visible
    /// instead of silently running a production host with development paths.
    pub fn from_env() -> Self {
        match std::env::var(PROFILE_ENV_VAR) {
            Ok(value) => Profile::parse(&value).unwrap_or_else(|| {
                warn!(
                    value = %value,
                    "Unrecognized {} value, falling back to development profile",
                    PROFILE_ENV_VAR
                );
                Self::Development
            }),
            Err(_) => Self::Development,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable configuration bundle resolved from a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub profile: Profile,

    /// Base directory under which each tenant gets its artifact directory.
    pub tenants_base_path: PathBuf,

    /// Shared API containers attached to every tenant's private network.
    pub shared_api_containers: Vec<String>,

    /// Name of the platform-shared network.
    pub shared_network_name: String,

    /// Filename of the rendered compose descriptor for this profile.
    pub compose_filename: String,
}

impl ProfileConfig {
    /// Resolve the configuration bundle for a profile.
    ///
    /// `BURROW_TENANTS_DIR` overrides the base path in any profile.
    pub fn resolve(profile: Profile) -> Self {
        match profile {
            Profile::Development => Self {
                profile,
                tenants_base_path: paths::tenants_dir(),
                shared_api_containers: vec![
                    "burrow-user-api-1".to_string(),
                    "burrow-content-api-1".to_string(),
                ],
                shared_network_name: "burrow_burrow-net".to_string(),
                compose_filename: "docker-compose.tenant.dev.yml".to_string(),
            },
            Profile::Staging => Self {
                profile,
                tenants_base_path: Self::system_base_path(),
                shared_api_containers: vec![
                    "burrow-api-user-staging".to_string(),
                    "burrow-api-content-staging".to_string(),
                ],
                shared_network_name: "burrow-core-net".to_string(),
                compose_filename: "docker-compose.tenant.staging.yml".to_string(),
            },
            Profile::Production => Self {
                profile,
                tenants_base_path: Self::system_base_path(),
                shared_api_containers: vec![
                    "burrow-api-user-prod".to_string(),
                    "burrow-api-content-prod".to_string(),
                ],
                shared_network_name: "burrow-core-net".to_string(),
                compose_filename: "docker-compose.tenant.prod.yml".to_string(),
            },
        }
    }

    fn system_base_path() -> PathBuf {
        if let Ok(dir) = std::env::var("BURROW_TENANTS_DIR") {
            return PathBuf::from(dir);
        }
        PathBuf::from("/var/lib/burrow/tenants")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("development"), Some(Profile::Development));
        assert_eq!(Profile::parse("staging"), Some(Profile::Staging));
        assert_eq!(Profile::parse("production"), Some(Profile::Production));
        assert!(Profile::parse("prod").is_none());
        assert!(Profile::parse("").is_none());
    }

    #[test]
    fn test_resolve_compose_filename_per_profile() {
        assert_eq!(
            ProfileConfig::resolve(Profile::Development).compose_filename,
            "docker-compose.tenant.dev.yml"
        );
        assert_eq!(
            ProfileConfig::resolve(Profile::Staging).compose_filename,
            "docker-compose.tenant.staging.yml"
        );
        assert_eq!(
            ProfileConfig::resolve(Profile::Production).compose_filename,
            "docker-compose.tenant.prod.yml"
        );
    }

    #[test]
    fn test_resolve_shared_containers() {
        let config = ProfileConfig::resolve(Profile::Production);
        assert_eq!(config.shared_api_containers.len(), 2);
        assert_eq!(config.shared_network_name, "burrow-core-net");
    }
}
