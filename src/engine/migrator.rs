//! engine::migrator
//!
//! The migration engine interface.
//!
//! # Design
//!
//! The trait is async because every operation touches the database or the
//! filesystem. Ordering, batch tracking and schema changes are the engine's
//! business; the CLI only awaits the result and reports it.
//!
//! # Example
//!
//! ```
//! use knex_cli::engine::mock::MockEngine;
//! use knex_cli::engine::MigrationEngine;
//!
//! # tokio_test_block_on(async {
//! let engine = MockEngine::with_pending(["20240101_create_users.js"]);
//! let batch = engine.latest().await.unwrap();
//! assert_eq!(batch.batch, 1);
//! assert_eq!(batch.log, vec!["20240101_create_users.js"]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use crate::error::EngineError;
use crate::types::{Extension, MigrationBatch};
use async_trait::async_trait;

/// Options for creating a migration file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MakeOptions {
    /// Stub extension for the new migration file
    pub extension: Extension,
}

/// Operations the CLI delegates to a migration engine
#[async_trait]
pub trait MigrationEngine: std::fmt::Debug + Send + Sync {
    /// Create a named migration file, returning the generated file name
    async fn make(&self, name: &str, options: &MakeOptions) -> Result<String, EngineError>;

    /// Apply every pending migration as one batch
    ///
    /// An empty log means everything was already applied.
    async fn latest(&self) -> Result<MigrationBatch, EngineError>;

    /// Revert the most recent batch
    ///
    /// An empty log means there was nothing left to revert.
    async fn rollback(&self) -> Result<MigrationBatch, EngineError>;

    /// Identifier of the most recently applied migration
    async fn current_version(&self) -> Result<String, EngineError>;
}
