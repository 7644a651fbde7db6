//! Error types for the knex CLI
//!
//! This module defines the error types used throughout the CLI. Every failure
//! a command can produce is a [`CliError`]; its variants are the failure
//! classes reported to the user. Resolver and engine failures have their own
//! types and convert into `CliError` at the command boundary.

use crate::output::tildify;
use std::path::PathBuf;

/// Failure class of a [`CliError`], independent of its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    AlreadyExists,
    MissingDependency,
    Io,
    Engine,
    Environment,
}

/// Environment resolution errors
///
/// A knexfile that is simply absent is not an error; these are the cases
/// where something was found but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The working directory could not be determined
    #[error("Unable to determine working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    /// `--cwd` points somewhere that is not a directory
    #[error("Working directory {} does not exist", .0.display())]
    MissingCwd(PathBuf),

    /// `--knexfile` points at a file that does not exist
    #[error("Knexfile {} does not exist", .0.display())]
    ConfigNotFound(PathBuf),

    /// A knexfile exists but cannot be read
    #[error("Unable to read knexfile {}: {source}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local module's package manifest is malformed
    #[error("Invalid package manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}

/// Failure surfaced by a migration engine
///
/// `message` is the one-line summary; `detail` carries the full diagnostic
/// (a stack trace or the migrator's stderr) when the engine provides one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
    pub detail: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Attach the full diagnostic text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Top-level error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Malformed or unsupported flag value
    #[error("{0}")]
    InvalidInput(String),

    /// Scaffolding target already present
    #[error("Error: {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// No local knex install could be found
    #[error("No local knex install found in: {}\nTry running: npm install knex.", tildify(.cwd))]
    MissingDependency { cwd: PathBuf },

    /// Filesystem failure while scaffolding
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure returned by the migration engine
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Environment could not be resolved
    #[error(transparent)]
    Environment(#[from] EnvError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::InvalidInput(_) => ErrorKind::InvalidInput,
            CliError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            CliError::MissingDependency { .. } => ErrorKind::MissingDependency,
            CliError::Io { .. } => ErrorKind::Io,
            CliError::Engine(_) => ErrorKind::Engine,
            CliError::Environment(_) => ErrorKind::Environment,
        }
    }

    /// Full diagnostic text, when the error carries more than its summary
    pub fn detail(&self) -> Option<&str> {
        match self {
            CliError::Engine(e) => e.detail.as_deref(),
            _ => None,
        }
    }
}
