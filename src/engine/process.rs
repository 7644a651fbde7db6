//! engine::process
//!
//! Standalone-mode engine backed by the local knex install.
//!
//! # Design
//!
//! The local module ships a migrator executable (`bin/knex-migrate` unless
//! its manifest says otherwise). Each operation runs it once in the resolved
//! working directory:
//!
//! ```text
//! <migrator> make <name> --extension <ext>  --env <name> [--knexfile <path>] [--debug]
//! <migrator> latest                          --env <name> [--knexfile <path>] [--debug]
//! <migrator> rollback                        --env <name> [--knexfile <path>] [--debug]
//! <migrator> current-version                 --env <name> [--knexfile <path>] [--debug]
//! ```
//!
//! A supplied [`KnexConfig`] is written to the child's stdin as JSON. On
//! success the last non-empty stdout line is a JSON object:
//! `{"name": ...}`, `{"batch": n, "log": [...]}` or `{"version": ...}`.
//! On failure the last non-empty stderr line is the message and the whole
//! stderr is the detail.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::migrator::{MakeOptions, MigrationEngine};
use crate::config::{Environment, GlobalOptions, KnexConfig, LocalModule};
use crate::error::EngineError;
use crate::types::MigrationBatch;

#[derive(Debug, Deserialize)]
struct MakeResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Engine that runs the local module's migrator executable
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: PathBuf,
    cwd: PathBuf,
    common_args: Vec<String>,
    stdin: Option<String>,
}

impl ProcessEngine {
    /// Bind an engine to a local module and the resolved run context
    pub fn new(
        module: &LocalModule,
        env: &Environment,
        options: &GlobalOptions,
        config: Option<&KnexConfig>,
    ) -> Result<Self, EngineError> {
        let mut common_args = vec!["--env".to_string(), options.env.to_string()];
        if let Some(path) = &env.config_path {
            common_args.push("--knexfile".to_string());
            common_args.push(path.display().to_string());
        }
        if options.debug {
            common_args.push("--debug".to_string());
        }

        let stdin = config
            .map(|c| c.to_json())
            .transpose()
            .map_err(|e| EngineError::new(format!("Unable to encode knex configuration: {}", e)))?;

        Ok(Self {
            program: module.migrator_path(),
            cwd: env.cwd.clone(),
            common_args,
            stdin,
        })
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    async fn invoke<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, EngineError> {
        if !self.program.is_file() {
            return Err(EngineError::new(format!(
                "Knex migrator not found at {}",
                self.program.display()
            )));
        }

        tracing::debug!(
            program = %self.program.display(),
            args = ?args,
            cwd = %self.cwd.display(),
            "running migrator"
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .args(&self.common_args)
            .current_dir(&self.cwd)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::new(format!(
                    "Failed to start migrator {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        // Feed stdin while the output is drained, so a child that never
        // reads it cannot stall the pipes.
        let writer = match (self.stdin.clone(), child.stdin.take()) {
            (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
                pipe.write_all(input.as_bytes()).await?;
                pipe.shutdown().await?;
                Ok::<(), io::Error>(())
            })),
            _ => None,
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| EngineError::new(format!("Failed to wait for migrator: {}", e)))?;

        if let Some(writer) = writer {
            let written = writer
                .await
                .map_err(|e| EngineError::new(format!("Failed to write to migrator: {}", e)))?;
            match written {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    tracing::debug!("migrator closed stdin before reading the configuration");
                }
                Err(e) if output.status.success() => {
                    return Err(EngineError::new(format!(
                        "Failed to write to migrator: {}",
                        e
                    )));
                }
                Err(e) => tracing::warn!(error = %e, "failed to write to migrator"),
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = last_line(&stderr)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Migrator exited with {}", output.status));
            let err = EngineError::new(message);
            return Err(if stderr.trim().is_empty() {
                err
            } else {
                err.with_detail(stderr.trim_end())
            });
        }

        let line = last_line(&stdout)
            .ok_or_else(|| EngineError::new("Migrator produced no output"))?;
        serde_json::from_str(line).map_err(|e| {
            EngineError::new(format!("Unexpected migrator output: {}", e)).with_detail(stdout.trim_end())
        })
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

#[async_trait]
impl MigrationEngine for ProcessEngine {
    async fn make(&self, name: &str, options: &MakeOptions) -> Result<String, EngineError> {
        let response: MakeResponse = self
            .invoke(&["make", name, "--extension", options.extension.as_str()])
            .await?;
        Ok(response.name)
    }

    async fn latest(&self) -> Result<MigrationBatch, EngineError> {
        self.invoke(&["latest"]).await
    }

    async fn rollback(&self) -> Result<MigrationBatch, EngineError> {
        self.invoke(&["rollback"]).await
    }

    async fn current_version(&self) -> Result<String, EngineError> {
        let response: VersionResponse = self.invoke(&["current-version"]).await?;
        Ok(response.version)
    }
}
