//! Migration commands
//!
//! Each handler delegates exactly one call to the migration engine and turns
//! the result into console text. Engine failures pass through unchanged.

use crate::cli::common::{CommandContext, parse_extension};
use crate::engine::MakeOptions;
use crate::error::CliError;
use crate::output::{Message, Tone};
use crate::types::{Extension, MigrationBatch};

/// Create a named migration file
///
/// The extension comes from `-x` when given, otherwise from the resolved
/// knexfile. With neither there is nothing to infer from, and the command
/// fails rather than picking a default.
pub async fn run_make(
    ctx: &CommandContext<'_>,
    name: &str,
    extension: Option<&str>,
) -> Result<Message, CliError> {
    let extension = make_extension(ctx, extension)?;
    let engine = ctx.engine()?;
    let created = engine.make(name, &MakeOptions { extension }).await?;
    Ok(Message::toned(
        Tone::Success,
        format!("Created Migration: {}", created),
    ))
}

fn make_extension(ctx: &CommandContext<'_>, flag: Option<&str>) -> Result<Extension, CliError> {
    if let Some(tag) = flag {
        return parse_extension(tag);
    }
    match &ctx.env.config_path {
        None => Err(CliError::InvalidInput(format!(
            "Unable to infer the migration extension: no knexfile found, pass -x <{}>",
            Extension::choices()
        ))),
        Some(path) => Extension::from_path(path).ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Unable to infer the migration extension from {}, pass -x <{}>",
                path.display(),
                Extension::choices()
            ))
        }),
    }
}

/// Run all migrations that have not yet been run
pub async fn run_latest(ctx: &CommandContext<'_>) -> Result<Message, CliError> {
    let batch = ctx.engine()?.latest().await?;
    Ok(batch_message(&batch, "run", "Already up to date"))
}

/// Roll back the last batch
pub async fn run_rollback(ctx: &CommandContext<'_>) -> Result<Message, CliError> {
    let batch = ctx.engine()?.rollback().await?;
    Ok(batch_message(
        &batch,
        "rolled back",
        "Already at the base migration",
    ))
}

/// Report the current migration version
pub async fn run_current_version(ctx: &CommandContext<'_>) -> Result<Message, CliError> {
    let version = ctx.engine()?.current_version().await?;
    Ok(Message::toned(Tone::Success, "Current Version: ").push(Tone::Accent, version))
}

fn batch_message(batch: &MigrationBatch, verb: &str, empty: &str) -> Message {
    if batch.is_empty() {
        return Message::toned(Tone::Info, empty);
    }
    Message::toned(
        Tone::Success,
        format!(
            "Batch {} {}: {} migrations\n",
            batch.batch,
            verb,
            batch.log.len()
        ),
    )
    .push(Tone::Info, batch.log.join("\n"))
}
