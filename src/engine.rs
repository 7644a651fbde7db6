//! Migration engine seam
//!
//! The CLI never migrates anything itself. Commands talk to a
//! [`MigrationEngine`] obtained from an [`EngineProvider`], which either
//! drives the locally installed knex module or hands back an engine supplied
//! by an embedding program.

pub mod migrator;
pub mod mock;
pub mod process;
pub mod provider;

pub use migrator::{MakeOptions, MigrationEngine};
pub use process::ProcessEngine;
pub use provider::{EngineFactory, EngineProvider, ProviderMode};
