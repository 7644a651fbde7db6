#![forbid(unsafe_code)]

//! knex-cli: command-line front end for knex migrations
//!
//! Resolves a project's knexfile and local knex install, then runs one of
//! five lifecycle commands (`init`, `migrate:make`, `migrate:latest`,
//! `migrate:rollback`, `migrate:currentVersion`) against a migration engine
//! and turns the result into console output and an exit code.
//!
//! The engine is either the local knex install driven as a child process
//! (standalone) or one supplied by an embedding program:
//!
//! ```no_run
//! use knex_cli::engine::{EngineProvider, mock::MockEngine};
//!
//! # async fn embed() -> std::process::ExitCode {
//! let provider = EngineProvider::instance(MockEngine::with_pending(["001_users.js"]));
//! knex_cli::cli::bootstrap(provider).await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod types;

// Re-export error types for convenient access
pub use error::{CliError, EngineError, EnvError, ErrorKind};

// Re-export core domain types for convenient access
pub use types::{EnvName, Extension, MigrationBatch};
