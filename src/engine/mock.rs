//! engine::mock
//!
//! In-memory migration engine for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a list of pending and applied migrations and groups
//! applied migrations into batches, so `latest` followed by `latest` reports
//! nothing to do and `rollback` reverts exactly the last batch. Failures can
//! be injected per operation and every call is recorded.
//!
//! # Example
//!
//! ```
//! use knex_cli::engine::mock::{MockEngine, MockOperation};
//! use knex_cli::engine::MigrationEngine;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let engine = MockEngine::with_pending(["001_users.js", "002_posts.js"]);
//!
//! let first = engine.latest().await.unwrap();
//! assert_eq!(first.log.len(), 2);
//!
//! let second = engine.latest().await.unwrap();
//! assert!(second.is_empty());
//!
//! assert_eq!(engine.operations(), vec![MockOperation::Latest, MockOperation::Latest]);
//! # });
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::migrator::{MakeOptions, MigrationEngine};
use crate::error::EngineError;
use crate::types::MigrationBatch;

/// Version reported when nothing has been applied
pub const BASE_VERSION: &str = "none";

/// Mock engine for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    inner: Arc<Mutex<MockEngineInner>>,
}

#[derive(Debug, Default)]
struct MockEngineInner {
    /// Migrations not yet applied, in apply order.
    pending: Vec<String>,
    /// Applied batches, oldest first.
    batches: Vec<MigrationBatch>,
    /// Batch number of the most recent batch ever applied.
    last_batch: u64,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Make(EngineError),
    Latest(EngineError),
    Rollback(EngineError),
    CurrentVersion(EngineError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Make { name: String, options: MakeOptions },
    Latest,
    Rollback,
    CurrentVersion,
}

impl MockEngine {
    /// Create an engine with nothing pending and nothing applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given migrations pending.
    pub fn with_pending<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = Self::new();
        engine.lock().pending = names.into_iter().map(Into::into).collect();
        engine
    }

    /// Make the given operation fail until cleared.
    pub fn fail_on(&self, fail: FailOn) {
        self.lock().fail_on = Some(fail);
    }

    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    /// Operations performed so far, oldest first.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Migrations still pending.
    pub fn pending(&self) -> Vec<String> {
        self.lock().pending.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockEngineInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MigrationEngine for MockEngine {
    async fn make(&self, name: &str, options: &MakeOptions) -> Result<String, EngineError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Make {
            name: name.to_string(),
            options: *options,
        });
        if let Some(FailOn::Make(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let applied: usize = inner.batches.iter().map(|b| b.log.len()).sum();
        let sequence = inner.pending.len() + applied;
        let file = format!("{:03}_{}.{}", sequence + 1, name, options.extension);
        inner.pending.push(file.clone());
        Ok(file)
    }

    async fn latest(&self) -> Result<MigrationBatch, EngineError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Latest);
        if let Some(FailOn::Latest(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        if inner.pending.is_empty() {
            return Ok(MigrationBatch::new(inner.last_batch, Vec::new()));
        }
        inner.last_batch += 1;
        let log = std::mem::take(&mut inner.pending);
        let batch = MigrationBatch::new(inner.last_batch, log);
        inner.batches.push(batch.clone());
        Ok(batch)
    }

    async fn rollback(&self) -> Result<MigrationBatch, EngineError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Rollback);
        if let Some(FailOn::Rollback(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        match inner.batches.pop() {
            Some(batch) => {
                let mut reverted = batch.log.clone();
                reverted.reverse();
                let mut restored = batch.log;
                restored.append(&mut inner.pending);
                inner.pending = restored;
                inner.last_batch = inner.batches.last().map(|b| b.batch).unwrap_or(0);
                Ok(MigrationBatch::new(batch.batch, reverted))
            }
            None => Ok(MigrationBatch::new(0, Vec::new())),
        }
    }

    async fn current_version(&self) -> Result<String, EngineError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::CurrentVersion);
        if let Some(FailOn::CurrentVersion(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let version = inner
            .batches
            .last()
            .and_then(|b| b.log.last())
            .map(|name| name.split('_').next().unwrap_or(name).to_string())
            .unwrap_or_else(|| BASE_VERSION.to_string());
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Extension;

    #[tokio::test]
    async fn test_latest_applies_pending_as_one_batch() {
        let engine = MockEngine::with_pending(["001_users.js", "002_posts.js"]);

        let batch = engine.latest().await.unwrap();
        assert_eq!(batch.batch, 1);
        assert_eq!(batch.log, vec!["001_users.js", "002_posts.js"]);
        assert!(engine.pending().is_empty());
    }

    #[tokio::test]
    async fn test_latest_twice_is_up_to_date() {
        let engine = MockEngine::with_pending(["001_users.js"]);
        engine.latest().await.unwrap();

        let again = engine.latest().await.unwrap();
        assert!(again.is_empty());
        assert_eq!(again.batch, 1);
    }

    #[tokio::test]
    async fn test_rollback_reverts_last_batch_only() {
        let engine = MockEngine::with_pending(["001_users.js"]);
        engine.latest().await.unwrap();
        engine
            .make("posts", &MakeOptions { extension: Extension::Js })
            .await
            .unwrap();
        engine.latest().await.unwrap();

        let reverted = engine.rollback().await.unwrap();
        assert_eq!(reverted.batch, 2);
        assert_eq!(reverted.log, vec!["002_posts.js"]);
        assert_eq!(engine.current_version().await.unwrap(), "001");
    }

    #[tokio::test]
    async fn test_rollback_at_base() {
        let engine = MockEngine::new();
        let batch = engine.rollback().await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(engine.current_version().await.unwrap(), BASE_VERSION);
    }

    #[tokio::test]
    async fn test_make_uses_extension() {
        let engine = MockEngine::new();
        let name = engine
            .make("create_users", &MakeOptions { extension: Extension::Ts })
            .await
            .unwrap();
        assert_eq!(name, "001_create_users.ts");
        assert_eq!(engine.pending(), vec!["001_create_users.ts"]);
    }

    #[tokio::test]
    async fn test_fail_on_injects_error() {
        let engine = MockEngine::with_pending(["001_users.js"]);
        engine.fail_on(FailOn::Latest(EngineError::new("connection refused")));

        let err = engine.latest().await.unwrap_err();
        assert_eq!(err.message, "connection refused");
        assert_eq!(engine.pending(), vec!["001_users.js"]);

        engine.clear_failure();
        assert_eq!(engine.latest().await.unwrap().log.len(), 1);
    }

    #[tokio::test]
    async fn test_operations_are_recorded() {
        let engine = MockEngine::new();
        engine.current_version().await.unwrap();
        engine.rollback().await.unwrap();
        assert_eq!(
            engine.operations(),
            vec![MockOperation::CurrentVersion, MockOperation::Rollback]
        );
    }
}
