//! Run-context configuration: global options, knexfile discovery and the
//! locally installed knex module

pub mod client;
pub mod environment;
pub mod manifest;
pub mod options;

pub use client::{KnexConfig, MigrationsConfig};
pub use environment::{Environment, LocalModule, Resolver};
pub use manifest::ModuleManifest;
pub use options::{ENV_VAR, GlobalOptions};
