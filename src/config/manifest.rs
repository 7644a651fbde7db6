//! Package manifest of the locally installed knex module

use crate::error::EnvError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Migrator executable used when the manifest does not name one
pub const DEFAULT_MIGRATOR: &str = "bin/knex-migrate";

/// The fields of `package.json` the CLI relies on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleManifest {
    #[serde(default = "unknown_version")]
    pub version: String,

    /// Migrator executable, relative to the module root
    #[serde(default)]
    pub migrator: Option<String>,
}

fn unknown_version() -> String {
    "unknown".to_string()
}

impl ModuleManifest {
    /// Load a manifest from a `package.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| EnvError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| EnvError::Manifest {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse a manifest from JSON text
    pub fn parse(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    /// Absolute path of the migrator executable for a module rooted at `root`
    pub fn migrator_path(&self, root: &Path) -> PathBuf {
        root.join(self.migrator.as_deref().unwrap_or(DEFAULT_MIGRATOR))
    }
}
