//! Engine configuration loaded from TOML.
//!
//! ```toml
//! database = "postgres"
//!
//! [entities.users]
//! statement = "SELECT id, name, status FROM users"
//! primary_key = "id"
//! per_page = 25
//!
//! [entities.users.search_columns]
//! name = { op = "i_cont" }
//! code = { op = "start", type = "string" }
//!
//! [entities.users.order]
//! name = "asc"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builder::SqlEngine;
use crate::dialect::DatabaseType;
use crate::error::Result;
use crate::request::QueryDefinition;

/// Dialect plus named entity definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target database; unsupported tags fail at load time.
    pub database: DatabaseType,
    /// Entity definitions by name.
    #[serde(default)]
    pub entities: IndexMap<String, QueryDefinition>,
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        tracing::debug!(
            database = %config.database,
            entities = config.entities.len(),
            "loaded engine configuration"
        );
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Look up an entity definition.
    pub fn entity(&self, name: &str) -> Option<&QueryDefinition> {
        self.entities.get(name)
    }

    /// Engine for the configured dialect.
    pub const fn engine(&self) -> SqlEngine {
        SqlEngine::from_config(self)
    }
}
