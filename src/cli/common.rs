//! Common helpers shared across CLI commands
//!
//! This module provides the exit codes, the read-only context every command
//! handler receives, and validation of the `-x` extension flag.

use crate::config::{Environment, GlobalOptions};
use crate::engine::{EngineProvider, MigrationEngine};
use crate::error::CliError;
use crate::types::Extension;
use std::sync::Arc;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Everything a command handler may read
///
/// Built once per invocation after the environment is resolved; handlers
/// never mutate it.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub env: &'a Environment,
    pub options: &'a GlobalOptions,
    pub provider: &'a EngineProvider,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        env: &'a Environment,
        options: &'a GlobalOptions,
        provider: &'a EngineProvider,
    ) -> Self {
        Self {
            env,
            options,
            provider,
        }
    }

    /// Obtain the migration engine for this invocation
    pub fn engine(&self) -> Result<Arc<dyn MigrationEngine>, CliError> {
        self.provider.engine(self.env, self.options)
    }
}

/// Validate a `-x` value against the recognized extensions
///
/// # Errors
///
/// Returns `CliError::InvalidInput` for any tag outside `js|coffee|ts|eg|ls`.
pub(crate) fn parse_extension(tag: &str) -> Result<Extension, CliError> {
    Extension::parse(tag).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "Invalid filetype specified: {}",
            tag.to_lowercase()
        ))
    })
}
