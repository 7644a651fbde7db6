#![forbid(unsafe_code)]

//! Core domain types for the knex CLI
//!
//! This module defines the small value types shared by the resolver, the
//! command handlers and the migration engines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File-type tags accepted by `-x` and recognized as knexfile extensions
///
/// The set is closed: anything else is rejected as invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    #[default]
    Js,
    Coffee,
    Ts,
    Eg,
    Ls,
}

impl Extension {
    /// All recognized extensions, in knexfile search order
    pub const ALL: [Extension; 5] = [
        Extension::Js,
        Extension::Coffee,
        Extension::Ts,
        Extension::Eg,
        Extension::Ls,
    ];

    /// Parses a tag case-insensitively
    ///
    /// Returns None if the tag is not one of the recognized extensions.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "js" => Some(Extension::Js),
            "coffee" => Some(Extension::Coffee),
            "ts" => Some(Extension::Ts),
            "eg" => Some(Extension::Eg),
            "ls" => Some(Extension::Ls),
            _ => None,
        }
    }

    /// Infers the extension from a file path such as `knexfile.ts`
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Returns the extension tag as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Js => "js",
            Extension::Coffee => "coffee",
            Extension::Ts => "ts",
            Extension::Eg => "eg",
            Extension::Ls => "ls",
        }
    }

    /// The `js|coffee|ts|eg|ls` listing used in help text
    pub fn choices() -> String {
        Self::ALL
            .iter()
            .map(|ext| ext.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Name of the knexfile environment section to run against
///
/// Never empty; an empty value falls back to the default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvName(String);

impl EnvName {
    /// Environment used when neither `--env` nor `NODE_ENV` is set
    pub const DEFAULT: &'static str = "development";

    /// Creates a new EnvName, falling back to the default for blank input
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            EnvName(Self::DEFAULT.to_string())
        } else {
            EnvName(trimmed.to_string())
        }
    }

    /// Returns the environment name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EnvName {
    fn default() -> Self {
        EnvName(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of applying or reverting one batch of migrations
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationBatch {
    /// Batch number the engine assigned to this run
    pub batch: u64,

    /// Migration identifiers in the order they were applied or reverted
    #[serde(default)]
    pub log: Vec<String>,
}

impl MigrationBatch {
    pub fn new(batch: u64, log: Vec<String>) -> Self {
        Self { batch, log }
    }

    /// True when the engine had nothing to do
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
