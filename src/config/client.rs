//! Connection configuration handed to the migrator in standalone mode

use serde::{Deserialize, Serialize};

/// Configuration object an embedder passes in place of a knexfile
///
/// Mirrors the shape of a knexfile environment section. The CLI does not
/// interpret it; it is forwarded to the migrator as JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnexConfig {
    /// Database client name, e.g. `pg` or `sqlite3`
    pub client: String,

    /// Client-specific connection settings
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub connection: serde_json::Value,

    #[serde(default)]
    pub migrations: MigrationsConfig,
}

/// Migration settings of a [`KnexConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl KnexConfig {
    pub fn new(client: impl Into<String>, connection: serde_json::Value) -> Self {
        Self {
            client: client.into(),
            connection,
            migrations: MigrationsConfig::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
