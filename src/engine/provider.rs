//! engine::provider
//!
//! Migration engine selection and creation.
//!
//! # Design
//!
//! Commands ask the provider for an engine instead of constructing one, so
//! the dispatcher is the same whether the CLI runs on its own or inside an
//! embedding program. Engines are created lazily, only when a `migrate:*`
//! command actually runs.
//!
//! # Modes
//!
//! - **Standalone**: the engine drives the locally installed knex module.
//!   Scaffolding (`init`) is available because the module's stub templates
//!   are on disk.
//! - **Embedded**: the embedder supplies an engine instance or a factory.
//!   `init` is not registered since there is no guaranteed module layout.

use std::sync::Arc;

use super::migrator::MigrationEngine;
use super::process::ProcessEngine;
use crate::config::{Environment, GlobalOptions, KnexConfig};
use crate::error::{CliError, EngineError};

/// Builds an engine for an embedded invocation
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        env: &Environment,
        options: &GlobalOptions,
    ) -> Result<Arc<dyn MigrationEngine>, EngineError>;
}

impl<F> EngineFactory for F
where
    F: Fn(&Environment, &GlobalOptions) -> Result<Arc<dyn MigrationEngine>, EngineError>
        + Send
        + Sync,
{
    fn create(
        &self,
        env: &Environment,
        options: &GlobalOptions,
    ) -> Result<Arc<dyn MigrationEngine>, EngineError> {
        self(env, options)
    }
}

/// How the CLI was launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Standalone,
    Embedded,
}

/// Source of the migration engine for one invocation
pub enum EngineProvider {
    /// Drive the local knex module, optionally with an explicit config object
    Standalone { config: Option<KnexConfig> },
    /// Use an engine the embedder already built
    Instance(Arc<dyn MigrationEngine>),
    /// Build the engine from the resolved environment
    Factory(Box<dyn EngineFactory>),
}

impl EngineProvider {
    /// Standalone mode using the project's knexfile
    pub fn standalone() -> Self {
        EngineProvider::Standalone { config: None }
    }

    /// Standalone mode with a caller-supplied configuration object
    pub fn with_config(config: KnexConfig) -> Self {
        EngineProvider::Standalone {
            config: Some(config),
        }
    }

    /// Embedded mode with a ready engine
    pub fn instance(engine: impl MigrationEngine + 'static) -> Self {
        EngineProvider::Instance(Arc::new(engine))
    }

    /// Embedded mode with an engine factory
    pub fn factory(factory: impl EngineFactory + 'static) -> Self {
        EngineProvider::Factory(Box::new(factory))
    }

    pub fn mode(&self) -> ProviderMode {
        match self {
            EngineProvider::Standalone { .. } => ProviderMode::Standalone,
            EngineProvider::Instance(_) | EngineProvider::Factory(_) => ProviderMode::Embedded,
        }
    }

    /// Whether the `init` command is registered
    pub fn supports_scaffolding(&self) -> bool {
        self.mode() == ProviderMode::Standalone
    }

    /// Produce the engine for this invocation
    ///
    /// Standalone mode requires the local module; its absence is
    /// `MissingDependency`.
    pub fn engine(
        &self,
        env: &Environment,
        options: &GlobalOptions,
    ) -> Result<Arc<dyn MigrationEngine>, CliError> {
        match self {
            EngineProvider::Standalone { config } => {
                let module = env.require_module()?;
                tracing::debug!(module = %module.root.display(), "loading local knex module");
                let engine = ProcessEngine::new(module, env, options, config.as_ref())?;
                Ok(Arc::new(engine))
            }
            EngineProvider::Instance(engine) => Ok(Arc::clone(engine)),
            EngineProvider::Factory(factory) => {
                tracing::debug!("building engine from embedder factory");
                Ok(factory.create(env, options)?)
            }
        }
    }
}

impl std::fmt::Debug for EngineProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineProvider::Standalone { config } => f
                .debug_struct("Standalone")
                .field("config", config)
                .finish(),
            EngineProvider::Instance(_) => f.write_str("Instance"),
            EngineProvider::Factory(_) => f.write_str("Factory"),
        }
    }
}
