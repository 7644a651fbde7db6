//! knex CLI entry point

use knex_cli::engine::EngineProvider;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    knex_cli::cli::bootstrap(EngineProvider::standalone()).await
}
