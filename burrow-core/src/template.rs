//! Artifact templates and placeholder rendering.
//!
//! Templates are plain text files containing `{{TOKEN}}` markers. Rendering
//! substitutes every marker whose token appears in the map; markers with no
//! mapping are left verbatim in the output. That leniency is a deliberate
//! contract carried over from the template format's origins: a descriptor
//! with a leftover marker fails loudly at `docker compose` time rather than
//! at render time.

use crate::error::{BurrowError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Token → value map for one render pass.
pub type TokenMap = HashMap<String, String>;

/// Template names making up one tenant's artifact set.
pub const TEMPLATE_COMPOSE: &str = "docker-compose.tenant.yml.template";
pub const TEMPLATE_ENV: &str = "env.template";
pub const TEMPLATE_METADATA: &str = "tenant.json.template";
pub const TEMPLATE_SQL_DATABASES: &str = "01-create-databases.sql.template";
pub const TEMPLATE_SQL_USERS: &str = "02-init-users-db.sql.template";
pub const TEMPLATE_SQL_CONTENT: &str = "03-init-content-db.sql.template";

/// Replace every `{{TOKEN}}` marker with its mapped value.
///
/// Pure: identical template and token map always yield identical output.
pub fn render(content: &str, tokens: &TokenMap) -> String {
    let mut result = content.to_string();
    for (key, value) in tokens {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Source of template content.
///
/// The default set ships embedded in the binary; an operator can point at a
/// directory of overrides for custom stack descriptors.
#[derive(Debug, Clone)]
pub enum TemplateStore {
    Embedded,
    Dir(PathBuf),
}

impl TemplateStore {
    /// The built-in template set.
    pub fn embedded() -> Self {
        Self::Embedded
    }

    /// Read templates from a directory, one file per template name.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::Dir(dir.into())
    }

    /// Read a template's content by name.
    pub fn read(&self, name: &str) -> Result<String> {
        match self {
            Self::Embedded => embedded(name)
                .map(str::to_string)
                .ok_or_else(|| BurrowError::TemplateNotFound { name: name.to_string() }),
            Self::Dir(dir) => {
                let path = dir.join(name);
                std::fs::read_to_string(&path)
                    .map_err(|e| BurrowError::IoError { path, source: e })
            }
        }
    }
}

fn embedded(name: &str) -> Option<&'static str> {
    match name {
        TEMPLATE_COMPOSE => Some(include_str!("../templates/docker-compose.tenant.yml.template")),
        TEMPLATE_ENV => Some(include_str!("../templates/env.template")),
        TEMPLATE_METADATA => Some(include_str!("../templates/tenant.json.template")),
        TEMPLATE_SQL_DATABASES => {
            Some(include_str!("../templates/01-create-databases.sql.template"))
        }
        TEMPLATE_SQL_USERS => Some(include_str!("../templates/02-init-users-db.sql.template")),
        TEMPLATE_SQL_CONTENT => Some(include_str!("../templates/03-init-content-db.sql.template")),
        _ => None,
    }
}
